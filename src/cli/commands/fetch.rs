//! Fetch command - route one request through the active controller

use crate::cli::args::FetchArgs;
use crate::cli::host::resolve_target;
use crate::cli::HostEnv;
use crate::controller::{ResponseSource, Served};
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Method, Request, RequestMode};
use console::style;
use std::io::Write;
use tokio::fs;
use tracing::debug;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, env: &HostEnv) -> SwcacheResult<()> {
    let Some(record) = env.record().await?.filter(|r| r.is_active()) else {
        let origin = env
            .origin(None)
            .unwrap_or_else(|_| "this host".to_string());
        return Err(SwcacheError::NoActiveController(origin));
    };

    let method = parse_method(&args.method)?;
    let url = resolve_target(&record.origin, &args.target)?;
    let mut request = Request::new(method, url);
    if args.navigate {
        request = request.with_mode(RequestMode::Navigate);
    }

    let registration = env.registration(&record.origin, args.offline).await?;
    debug!("Dispatching {} {} ({})", request.method, request.url, request.mode);
    let served = registration.dispatch(&request).await?;

    eprintln!("{}", summary(&request, &served));

    if args.include {
        println!("HTTP {}", served.response.status);
        for (name, value) in &served.response.headers {
            println!("{}: {}", name, value);
        }
        println!();
    }

    match args.output {
        Some(path) => {
            fs::write(&path, &served.response.body)
                .await
                .map_err(|e| SwcacheError::io(format!("writing {}", path.display()), e))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&served.response.body)
                .and_then(|_| stdout.flush())
                .map_err(|e| SwcacheError::io("writing response body", e))?;
        }
    }

    Ok(())
}

fn parse_method(method: &str) -> SwcacheResult<Method> {
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| SwcacheError::User(format!("Invalid HTTP method: {}", method)))
}

fn summary(request: &Request, served: &Served) -> String {
    let source = match served.source {
        ResponseSource::Cache => style(served.source.to_string()).green(),
        ResponseSource::ShellFallback => style(served.source.to_string()).yellow(),
        _ => style(served.source.to_string()).cyan(),
    };
    format!(
        "{} {} {} [{}]",
        style(served.response.status).bold(),
        request.method,
        request.url,
        source
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_method_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("POST").unwrap(), Method::POST);
        assert!(parse_method("BAD METHOD").is_err());
    }
}
