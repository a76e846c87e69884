mod config;
mod controller;
mod error;
mod transport;

use clap::Parser;
use config::ConfigStore;
use controller::{ControllerEvent, DeviceController};
use giza_shared::{Command, DeviceStatus, StatusView};
use std::io::Write;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Remote control for the Giza pyramid unit over Wi-Fi HTTP or BLE
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Use this device IP for the session instead of the saved one
    #[arg(long)]
    ip: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let args = Args::parse();

    let store = ConfigStore::new()?;
    let mut app_config = store.load().await?;
    if args.ip.is_some() {
        app_config.device_ip = args.ip;
    }

    let (events_tx, mut events_rx) = mpsc::channel::<ControllerEvent>(100);
    let mut controller = DeviceController::new(store, app_config, events_tx);

    println!("Giza remote. Device link: {}", controller.transport());
    match controller.device_ip() {
        Some(ip) => println!("Saved IP: {}", ip),
        None => println!("No device IP saved; use `ip <addr>` or `ble`."),
    }
    print_help();

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if handle_line(&mut controller, &line).await {
                        break;
                    }
                    prompt();
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("stdin closed: {}", err);
                    break;
                }
            },
            Some(event) = events_rx.recv() => {
                println!();
                match event {
                    ControllerEvent::StatusUpdated(status) => render(&controller, &status),
                    ControllerEvent::LinkLost { reason } => {
                        controller.on_link_lost(&reason);
                        println!("BLE disconnected: {}", reason);
                        println!("Device link: {}", controller.transport());
                    }
                }
                prompt();
            },
        }
    }

    controller.stop_auto_refresh();
    Ok(())
}

/// Dispatch one line of input; returns true when the user quits.
///
/// Every failure is reported as one short message and the prompt comes
/// back; nothing here is fatal.
async fn handle_line(controller: &mut DeviceController, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return false;
    };

    match word.to_ascii_lowercase().as_str() {
        "help" | "?" => print_help(),
        "quit" | "exit" => return true,

        "ip" => match parts.next() {
            Some(addr) => match controller.set_device_ip(addr).await {
                Ok(()) => println!("Saved IP: {}", controller.device_ip().unwrap_or_default()),
                Err(err) => println!("Could not save IP: {}", err),
            },
            None => println!("Saved IP: {}", controller.device_ip().unwrap_or("<unset>")),
        },

        "wifi" => match controller.test_wifi().await {
            Ok(status) => {
                println!("Wi-Fi reachable");
                render(controller, &status);
            }
            Err(err) => println!("Wi-Fi not reachable: {}", err),
        },

        "ble" => match controller.connect_ble().await {
            Ok(()) => println!("BLE connected"),
            Err(err) => println!("BLE connect failed: {}", err),
        },

        "disconnect" => {
            if !controller.can_disconnect() {
                println!("Nothing to disconnect");
            } else {
                match controller.disconnect().await {
                    Ok(()) => println!("Disconnected. Device link: {}", controller.transport()),
                    Err(err) => println!("Disconnect failed: {}", err),
                }
            }
        }

        "status" => match controller.fetch_status().await {
            Ok(status) => render(controller, &status),
            Err(err) => println!("Status refresh failed: {}", err),
        },

        "auto" => match parts.next() {
            Some("on") => match controller.start_auto_refresh() {
                Ok(()) => println!("Auto refresh on"),
                Err(err) => println!("Cannot start auto refresh: {}", err),
            },
            Some("off") => {
                controller.stop_auto_refresh();
                println!("Auto refresh off");
            }
            _ => println!("Usage: auto on|off"),
        },

        other => match other.parse::<Command>() {
            Ok(command) => match controller.send_command(command).await {
                Ok(()) => println!("Sent {}", command),
                Err(err) => println!("Send failed: {}", err),
            },
            Err(_) => println!("Unknown input {:?}; try `help`", other),
        },
    }

    false
}

fn render(controller: &DeviceController, status: &DeviceStatus) {
    println!("{}", StatusView::project(status, controller.polarity()));
}

fn print_help() {
    println!("Commands:");
    println!("  ip <addr>      save the device IP");
    println!("  wifi           test Wi-Fi and select it");
    println!("  ble            scan + connect BLE and select it");
    println!("  disconnect     drop the active link");
    println!("  day|night|storm  send a mode command");
    println!("  status         fetch and show device status");
    println!("  auto on|off    toggle auto refresh");
    println!("  quit");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
