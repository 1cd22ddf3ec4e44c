#![allow(dead_code)]

#[macro_use]
extern crate log;

mod error;
mod winapi;

use clap::{Arg, ArgAction, Command};

fn cli() -> Command {
    Command::new("svcpoke")
        .version("0.1.0")
        .about("stop and remove Windows services, print the running module path")
        .subcommand(
            Command::new("poke")
                .about("stop and/or delete a named service")
                .arg(
                    Arg::new("service")
                        .required(true)
                        .help("service name as registered with the service control manager"),
                )
                .arg(
                    Arg::new("stop")
                        .long("stop")
                        .action(ArgAction::SetTrue)
                        .help("send a stop control and wait for the service to stop"),
                )
                .arg(
                    Arg::new("delete")
                        .long("delete")
                        .action(ArgAction::SetTrue)
                        .help("delete the service registration"),
                ),
        )
        .subcommand(Command::new("module-path").about("print the path of the running executable"))
}

#[cfg(windows)]
fn run() -> Result<(), error::Error> {
    match cli().get_matches().subcommand() {
        Some(("poke", matches)) => {
            let service = matches.get_one::<String>("service").expect("required");
            let stop = matches.get_flag("stop");
            let delete = matches.get_flag("delete");
            info!("poking service {:?}", service);
            winapi::service::poke_service(service, stop, delete)
        }
        Some(("module-path", _)) => {
            let path = winapi::module::process_module_path()?;
            println!("{}", path.display());
            Ok(())
        }
        _ => {
            let _ = cli().print_help();
            Ok(())
        }
    }
}

#[cfg(windows)]
fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
fn main() {
    env_logger::init();
    let _ = cli().get_matches();

    error!("svcpoke only runs on Windows");
    std::process::exit(1);
}
