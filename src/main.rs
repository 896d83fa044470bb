use rest_dispatch::{DispatcherConfig, Params, RequestDispatcher, logger};
use serde_json::Value;
use std::{env, process::ExitCode};
use tracing::Dispatch;

const USAGE: &str = "usage: rest-dispatch <verb>[_<segment>...] [segment...] [key=value...] [--payload <json>]";

struct Invocation {
    operation: String,
    segments: Vec<String>,
    params: Params,
    payload: Option<Value>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Invocation, String> {
    let operation = args.next().ok_or_else(|| USAGE.to_string())?;
    let mut invocation = Invocation { operation, segments: Vec::new(), params: Params::new(), payload: None };
    while let Some(arg) = args.next() {
        if arg == "--payload" {
            let raw = args.next().ok_or("--payload needs a JSON argument")?;
            let payload = serde_json::from_str(&raw).map_err(|e| format!("invalid payload: {e}"))?;
            invocation.payload = Some(payload);
        } else if let Some((key, value)) = arg.split_once('=') {
            invocation.params.insert(key.to_string(), Value::String(value.to_string()));
        } else {
            invocation.segments.push(arg);
        }
    }
    Ok(invocation)
}

fn report(console: &Dispatch, message: &str) {
    tracing::dispatcher::with_default(console, || tracing::error!("{message}"));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let console = logger::console(0);
    let invocation = match parse_args(env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(msg) => {
            report(&console, &msg);
            return ExitCode::from(2);
        }
    };
    let config = match DispatcherConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report(&console, &e.to_string());
            return ExitCode::from(2);
        }
    };
    let Some(operation) = RequestDispatcher::resolve(&invocation.operation) else {
        report(&console, &format!("operation not found: {}", invocation.operation));
        return ExitCode::from(2);
    };

    let mut dispatcher = match RequestDispatcher::new(&config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            report(&console, &e.to_string());
            return ExitCode::FAILURE;
        }
    };
    let result = dispatcher
        .call(&operation, invocation.segments.as_slice(), invocation.payload, invocation.params)
        .await;
    dispatcher.close();

    match result.map(|reply| serde_json::to_string_pretty(&reply)) {
        Ok(Ok(json)) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            report(&console, &format!("cannot render reply: {e}"));
            ExitCode::FAILURE
        }
        Err(e) => {
            report(&console, &e.to_string());
            ExitCode::FAILURE
        }
    }
}
