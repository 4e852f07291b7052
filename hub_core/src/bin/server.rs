use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{info, warn};

use hub_core::sandbox::{apply_command, SandboxReply};
use hub_core::{build_headless_app, run_tick, HubMetrics, HubTick, ServerConfig, WorldProperties};
use hub_runtime::{parse_command_line, SandboxCommand};

struct Request {
    command: SandboxCommand,
    reply: Sender<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut app = build_headless_app();
    let config = app.world.resource::<ServerConfig>().clone();

    if let Some(path) = &config.properties_path {
        match WorldProperties::open(path) {
            Ok(properties) => {
                info!(
                    target: "hub::server",
                    path = %path.display(),
                    entries = properties.len(),
                    "properties.loaded=file"
                );
                app.insert_resource(properties);
            }
            Err(err) => warn!(
                target: "hub::server",
                path = %path.display(),
                error = %err,
                "properties.load_failed"
            ),
        }
    }

    let command_rx = spawn_command_listener(config.command_bind);

    info!(
        command_bind = %config.command_bind,
        tick_millis = config.tick_millis,
        "Hub sandbox server ready"
    );

    let tick_interval = (config.tick_millis > 0).then(|| Duration::from_millis(config.tick_millis));
    let mut next_tick = Instant::now();
    loop {
        let request = match tick_interval {
            Some(interval) => {
                let now = Instant::now();
                if now >= next_tick {
                    run_tick(&mut app);
                    log_tick(&app);
                    next_tick = now + interval;
                }
                match command_rx.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
                    Ok(request) => request,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match command_rx.recv() {
                Ok(request) => request,
                Err(_) => break,
            },
        };
        handle_request(&mut app, request);
    }
}

fn handle_request(app: &mut bevy::app::App, request: Request) {
    let response = match apply_command(app, request.command) {
        Ok(reply) => {
            match &reply {
                SandboxReply::Command(outcome) => info!(
                    target: "hub::server",
                    success = outcome.is_success(),
                    message = %outcome.message,
                    "command.applied=admin"
                ),
                SandboxReply::Ticked { tick } => {
                    info!(target: "hub::server", tick, "command.applied=tick");
                    log_tick(app);
                }
                other => info!(target: "hub::server", reply = %other, "command.applied"),
            }
            reply.to_string()
        }
        Err(err) => {
            warn!(target: "hub::server", error = %err, "command.rejected");
            format!("error: {err}")
        }
    };
    let _ = request.reply.send(response);
}

fn log_tick(app: &bevy::app::App) {
    let tick = app.world.resource::<HubTick>().0;
    let metrics = app.world.resource::<HubMetrics>();
    if metrics.last_tick.enforcement.is_some() || metrics.last_tick.purge.is_some() {
        tracing::debug!(
            target: "hub::server",
            tick,
            enforced = metrics.actors_enforced,
            removed = metrics.hostiles_removed,
            failures = metrics.failures,
            "metrics.updated"
        );
    }
}

fn spawn_command_listener(bind_addr: SocketAddr) -> Receiver<Request> {
    let listener = TcpListener::bind(bind_addr).expect("command listener bind failed");
    listener
        .set_nonblocking(true)
        .expect("set_nonblocking failed");

    let (sender, receiver) = unbounded::<Request>();
    thread::spawn(move || loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!("Command client connected: {}", addr);
                let sender = sender.clone();
                thread::spawn(move || handle_client(stream, sender));
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                warn!("Error accepting command client: {}", err);
                thread::sleep(Duration::from_millis(200));
            }
        }
    });

    receiver
}

fn handle_client(stream: TcpStream, sender: Sender<Request>) {
    if let Err(err) = stream.set_nonblocking(false) {
        warn!("Command client setup failed: {}", err);
        return;
    }
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            warn!("Command client setup failed: {}", err);
            return;
        }
    };
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let response = match parse_command_line(trimmed) {
                    Ok(command) => {
                        let (reply_tx, reply_rx) = unbounded();
                        let request = Request {
                            command,
                            reply: reply_tx,
                        };
                        if sender.send(request).is_err() {
                            break;
                        }
                        match reply_rx.recv() {
                            Ok(response) => response,
                            Err(_) => break,
                        }
                    }
                    Err(err) => {
                        warn!("Invalid command: {} ({})", trimmed, err);
                        format!("error: {err}")
                    }
                };
                if writeln!(writer, "{response}").is_err() {
                    break;
                }
            }
            Err(err) => {
                warn!("Command read error: {}", err);
                break;
            }
        }
    }
}
