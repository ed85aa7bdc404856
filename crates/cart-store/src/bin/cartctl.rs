//! # cartctl
//!
//! Runs single cart operations against the configured store.
//!
//! ## Usage
//! ```bash
//! # Add two units of a product
//! cargo run -p cart-store --bin cartctl -- add user-1 OLJCESPC7Z 2
//!
//! # Show a cart as JSON
//! cargo run -p cart-store --bin cartctl -- --json get user-1
//!
//! # Point at a specific database and create the table
//! CART_DATABASE_URL=sqlite://./carts.db?mode=rwc CART_CREATE_SCHEMA=true \
//!     cargo run -p cart-store --bin cartctl -- ping
//! ```
//!
//! Log output goes to stderr and honours `RUST_LOG` (default `info`).

use std::env;
use std::path::PathBuf;

use cart_store::{open_store, Cart, StoreConfig};
use tracing_subscriber::EnvFilter;

enum Command {
    Add {
        user_id: String,
        product_id: String,
        quantity: i32,
    },
    Get {
        user_id: String,
    },
    Empty {
        user_id: String,
    },
    Ping,
}

fn print_help() {
    println!("Cart store control");
    println!();
    println!("Usage: cartctl [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  add <USER> <PRODUCT> <QTY>   Add QTY units of PRODUCT to USER's cart");
    println!("  get <USER>                   Print USER's cart");
    println!("  empty <USER>                 Remove every item from USER's cart");
    println!("  ping                         Liveness check");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>    Config file (default: platform config dir)");
    println!("      --json             Print carts as JSON");
    println!("  -h, --help             Show this help message");
}

fn parse_command(words: &[String]) -> Result<Command, String> {
    let arg = |i: usize, name: &str| {
        words
            .get(i)
            .cloned()
            .ok_or_else(|| format!("missing <{name}>"))
    };

    match words.first().map(String::as_str) {
        Some("add") => {
            let quantity = arg(3, "QTY")?;
            Ok(Command::Add {
                user_id: arg(1, "USER")?,
                product_id: arg(2, "PRODUCT")?,
                quantity: quantity
                    .parse()
                    .map_err(|_| format!("'{quantity}' is not a valid quantity"))?,
            })
        }
        Some("get") => Ok(Command::Get {
            user_id: arg(1, "USER")?,
        }),
        Some("empty") => Ok(Command::Empty {
            user_id: arg(1, "USER")?,
        }),
        Some("ping") => Ok(Command::Ping),
        Some(other) => Err(format!("unknown command '{other}'")),
        None => Err("no command given".to_string()),
    }
}

struct Invocation {
    config_path: Option<PathBuf>,
    json: bool,
    command: Command,
}

/// Parses flags and the command. `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Invocation>, String> {
    let mut config_path: Option<PathBuf> = None;
    let mut json = false;
    let mut words = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a <PATH>", args[i]))?;
                config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--json" => json = true,
            "--help" | "-h" => return Ok(None),
            _ => words.push(args[i].clone()),
        }
        i += 1;
    }

    Ok(Some(Invocation {
        config_path,
        json,
        command: parse_command(&words)?,
    }))
}

fn print_cart(cart: &Cart, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(cart)?);
        return Ok(());
    }

    if cart.is_empty() {
        println!("Cart for {} is empty", cart.user_id);
        return Ok(());
    }

    println!("Cart for {}:", cart.user_id);
    for item in &cart.items {
        println!("  {:<20} x{}", item.product_id, item.quantity);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let Invocation {
        config_path,
        json,
        command,
    } = match parse_args(&args) {
        Ok(Some(invocation)) => invocation,
        Ok(None) => {
            print_help();
            return Ok(());
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_help();
            std::process::exit(2);
        }
    };

    let config = StoreConfig::load(config_path)?;
    let store = open_store(&config).await?;

    match command {
        Command::Add {
            user_id,
            product_id,
            quantity,
        } => {
            store.add_item(&user_id, &product_id, quantity).await?;
            let cart = store.get_cart(&user_id).await?;
            println!(
                "✓ {} now has {} x {}",
                user_id,
                cart.quantity_of(&product_id),
                product_id
            );
        }
        Command::Get { user_id } => {
            let cart = store.get_cart(&user_id).await?;
            print_cart(&cart, json)?;
        }
        Command::Empty { user_id } => {
            store.empty_cart(&user_id).await?;
            println!("✓ Cart for {user_id} emptied");
        }
        Command::Ping => {
            println!("{}", if store.ping() { "ok" } else { "unavailable" });
        }
    }

    Ok(())
}
