use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use linkstate_sim::config::{self, TopologyConfig};
use linkstate_sim::{Delivery, Network};

#[derive(Parser)]
#[command(name = "linkstate-sim", about = "Link-state routing protocol simulator")]
struct Cli {
    /// JSON topology file; defaults to the built-in 6-router demo topology
    #[arg(long)]
    topology: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scripted demonstration scenario
    Demo,
    /// Drive the network from stdin commands
    Interactive,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.topology {
        Some(path) => TopologyConfig::load_from_file(path)?,
        None => config::demo_topology(),
    };

    let mut network = config.build()?;
    network.update_all_link_states();

    match cli.command {
        Command::Demo => run_demo(&mut network),
        Command::Interactive => run_interactive(&mut network),
    }
}

fn print_all_routing_tables(network: &Network) {
    let ids: Vec<String> = network.router_ids().cloned().collect();
    for id in ids {
        if let Some(router) = network.router(&id) {
            println!("{}", router.format_routing_table());
        }
    }
}

fn report(outcome: &Delivery) {
    match outcome {
        Delivery::Delivered { path, payload } => {
            println!("Delivered via {} (payload: {payload})", path.join(" -> "));
        }
        Delivery::Expired { at } => println!("Dropped at {at}: TTL expired"),
        Delivery::NoRoute { at } => println!("Dropped at {at}: no route"),
    }
}

fn run_demo(network: &mut Network) -> Result<()> {
    println!("=== Routing tables after initial convergence ===");
    print_all_routing_tables(network);

    println!("=== Test 1: R1 -> R4 (shortcut route) ===");
    report(&network.send("R1", "R4", json!("Hello from R1 to R4!"))?);

    println!("\n=== Test 2: link failure R3-R4 ===");
    network.simulate_link_failure("R3", "R4")?;
    print_all_routing_tables(network);

    println!("=== Test 3: R1 -> R4 after the failure ===");
    report(&network.send("R1", "R4", json!("Hello after link failure!"))?);

    println!("\n=== Test 4: R2 -> R6 ===");
    report(&network.send("R2", "R6", json!("Hello from R2 to R6!"))?);

    println!("\n=== Test 5: link recovery R3-R4 ===");
    network.simulate_link_recovery("R3", "R4", "eth2", "eth1", 1, 1)?;
    print_all_routing_tables(network);

    println!("=== Test 6: R1 -> R4 after the recovery ===");
    report(&network.send("R1", "R4", json!("Hello after link recovery!"))?);

    Ok(())
}

const HELP: &str = "Commands:
  tables                                   print every routing table
  send <src> <dst> <message...>            originate a data packet
  fail <a> <b>                             break a link
  recover <a> <b> <ifA> <ifB> [mA] [mB]    restore a link (default metrics 1)
  quit";

fn run_interactive(network: &mut Network) -> Result<()> {
    println!("{HELP}");
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        let result = match parts.as_slice() {
            [] => Ok(()),
            ["quit"] | ["exit"] => break,
            ["tables"] => {
                print_all_routing_tables(network);
                Ok(())
            }
            ["send", src, dst, message @ ..] => network
                .send(src, dst, json!(message.join(" ")))
                .map(|outcome| report(&outcome)),
            ["fail", a, b] => network.simulate_link_failure(a, b),
            ["recover", a, b, if_a, if_b, rest @ ..] => {
                let metric_a = rest.first().and_then(|m| m.parse().ok()).unwrap_or(1);
                let metric_b = rest.get(1).and_then(|m| m.parse().ok()).unwrap_or(1);
                network.simulate_link_recovery(a, b, if_a, if_b, metric_a, metric_b)
            }
            _ => {
                println!("{HELP}");
                Ok(())
            }
        };

        if let Err(err) = result {
            println!("Error: {err}");
        }
    }

    Ok(())
}
