//! Interactive console for the record gateway.
//!
//! Keeps one session (and its cookie) for the whole run, which is why this
//! is a REPL rather than one-shot subcommands.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use url::Url;

use records_gateway::console::{
    ConsoleApi, ConsoleError, DuplicateChecker, RecordsView, SubmitOutcome, DEBOUNCE_DELAY,
};

#[derive(Parser)]
#[command(name = "records-cli")]
#[command(about = "Interactive console for the record gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = Url::parse(&cli.url)?;
    let api = Arc::new(ConsoleApi::new(base)?);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();

    // Session check first; steer to login when there is none.
    loop {
        match api.session().await {
            Ok(user) => {
                let name = user
                    .get("usuario")
                    .and_then(|v| v.as_str())
                    .unwrap_or("(desconocido)");
                println!("Sesión activa: {}", name);
                break;
            }
            Err(ConsoleError::NotAuthenticated) => {
                out.write_all(b"usuario: ").await?;
                out.flush().await?;
                let Some(usuario) = input.next_line().await? else {
                    return Ok(());
                };
                out.write_all(b"password: ").await?;
                out.flush().await?;
                let Some(password) = input.next_line().await? else {
                    return Ok(());
                };
                match api.login(usuario.trim(), password.trim()).await {
                    Ok(()) => {}
                    Err(err) => println!("{}", err),
                }
            }
            Err(err) => {
                eprintln!("No se pudo contactar el gateway: {}", err);
                return Ok(());
            }
        }
    }

    let mut view = RecordsView::new(api.clone());
    if let Err(err) = view.reload().await {
        println!("{}", err);
    }
    print!("{}", view.render_table());

    let (checker, mut verdicts) = DuplicateChecker::new(api.clone(), DEBOUNCE_DELAY);
    tokio::spawn(async move {
        while verdicts.changed().await.is_ok() {
            let verdict = verdicts.borrow_and_update().clone();
            if let Some(verdict) = verdict {
                if verdict.exists {
                    println!(
                        "Este DNI/RUC ya está en uso. Por favor utiliza uno diferente. ({})",
                        verdict.dni_ruc
                    );
                }
            }
        }
    });

    println!("Comandos: list, edit <id>, set <campo> <valor>, save, add, cancel, del <id>, check <dni>, whoami, logout, quit");
    loop {
        out.write_all(b"> ").await?;
        out.flush().await?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        let mut parts = line.trim().splitn(3, ' ');
        let command = parts.next().unwrap_or("");
        match command {
            "" => {}
            "list" => {
                if let Err(err) = view.reload().await {
                    println!("{}", err);
                }
                print!("{}", view.render_table());
            }
            "edit" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) if view.begin_edit(id) => {
                    println!("Editando cliente {}", id);
                }
                _ => println!("Uso: edit <id>"),
            },
            "set" => {
                let field = parts.next().unwrap_or("");
                let value = parts.next().unwrap_or("").to_string();
                match field {
                    "dni" | "dni_ruc" => {
                        view.draft.dni_ruc = value.clone();
                        checker.input_changed(&value, view.draft.edit_id);
                    }
                    "nombre" | "nombre_completo" => view.draft.nombre_completo = value,
                    "telefono" => view.draft.telefono = value,
                    "correo" => view.draft.correo = value,
                    "direccion" => view.draft.direccion = value,
                    "estado" => view.draft.estado = value,
                    _ => println!("Campos: dni, nombre, telefono, correo, direccion, estado"),
                }
            }
            "save" | "add" => {
                let outcome = if command == "save" {
                    view.submit().await
                } else {
                    view.submit_append().await
                };
                match outcome {
                    SubmitOutcome::Saved => {
                        println!("Cliente guardado correctamente");
                        print!("{}", view.render_table());
                    }
                    SubmitOutcome::Invalid(err) => println!("{}", err),
                    SubmitOutcome::Conflict(message) => println!("{}", message),
                    SubmitOutcome::Failed(message) => println!("{}", message),
                }
            }
            "cancel" => view.cancel_edit(),
            "del" => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(id) => {
                    out.write_all(b"Eliminar cliente? (y/N) ").await?;
                    out.flush().await?;
                    let confirmed = matches!(
                        input.next_line().await?.as_deref().map(str::trim),
                        Some("y") | Some("Y")
                    );
                    if confirmed {
                        match view.delete_confirmed(id).await {
                            Ok(()) => print!("{}", view.render_table()),
                            Err(err) => println!("{}", err),
                        }
                    }
                }
                None => println!("Uso: del <id>"),
            },
            "check" => {
                let dni = parts.next().unwrap_or("");
                checker.focus_lost(dni, view.draft.edit_id);
            }
            "whoami" => match api.session().await {
                Ok(user) => println!("{}", serde_json::to_string_pretty(&user)?),
                Err(err) => println!("{}", err),
            },
            "logout" => {
                api.logout().await.ok();
                println!("Sesión cerrada");
                break;
            }
            "quit" | "exit" => break,
            _ => println!("Comando desconocido: {}", command),
        }
    }

    Ok(())
}
