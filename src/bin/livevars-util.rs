//! livevars command-line tool.

use anyhow::{anyhow, Result};
use livevars::{Liveness, Module, SweepOrder};
use log::debug;
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "livevars-util", about = "Live-variable analysis utility.")]
struct Options {
    #[structopt(short, long)]
    debug: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    #[structopt(name = "print-ir", about = "Parse IR text and print it back")]
    PrintIR {
        #[structopt(help = "IR file to parse")]
        file: PathBuf,
    },
    #[structopt(name = "analyze", about = "Print IR annotated with live values")]
    Analyze {
        #[structopt(help = "IR file to parse")]
        file: PathBuf,
        #[structopt(long, help = "Only analyze this function")]
        func: Option<String>,
        #[structopt(
            long,
            default_value = "layout",
            help = "Block sweep order: layout, postorder or rpo"
        )]
        order: Order,
    },
}

#[derive(Clone, Copy, Debug)]
enum Order {
    Layout,
    PostOrder,
    ReversePostOrder,
}

impl FromStr for Order {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Order> {
        match s {
            "layout" => Ok(Order::Layout),
            "postorder" => Ok(Order::PostOrder),
            "rpo" => Ok(Order::ReversePostOrder),
            _ => Err(anyhow!("unknown sweep order '{}'", s)),
        }
    }
}

impl From<Order> for SweepOrder {
    fn from(order: Order) -> SweepOrder {
        match order {
            Order::Layout => SweepOrder::Layout,
            Order::PostOrder => SweepOrder::PostOrder,
            Order::ReversePostOrder => SweepOrder::ReversePostOrder,
        }
    }
}

fn load(file: &PathBuf) -> Result<Module> {
    let text = std::fs::read_to_string(file)?;
    debug!("Loaded {} bytes of IR text", text.len());
    Module::from_text(&text)
}

fn main() -> Result<()> {
    let opts = Options::from_args();

    let mut logger = env_logger::Builder::from_default_env();
    if opts.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    let _ = logger.try_init();

    match opts.command {
        Command::PrintIR { file } => {
            let module = load(&file)?;
            print!("{}", module.display());
        }
        Command::Analyze { file, func, order } => {
            let module = load(&file)?;
            let order = SweepOrder::from(order);
            let funcs = match &func {
                Some(name) => vec![module
                    .func_by_name(name)
                    .ok_or_else(|| anyhow!("no function named @{}", name))?],
                None => module.funcs.iter().collect(),
            };
            for (i, func) in funcs.into_iter().enumerate() {
                let body = &module.funcs[func];
                let liveness = Liveness::compute_with_order(body, &order)
                    .map_err(|e| anyhow!("@{}: {}", body.name, e))?;
                debug!("@{}: {} sweeps", body.name, liveness.sweeps());
                if i > 0 {
                    println!();
                }
                print!("{}", liveness.display(body));
            }
        }
    }

    Ok(())
}
