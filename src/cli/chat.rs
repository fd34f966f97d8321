//! Terminal front end
//!
//! Same coordinator as the Slack bridge, without the messaging tool. Steps are
//! printed as they are observed, then the answer.

use crate::server::{build_coordinator, config::AppConfig};
use anyhow::Result;
use kubepilot_core::{
    format_error_for_chat, DispatchEvent, DispatchOutcome, DispatchRequest, Dispatcher, EventBus,
};
use kubepilot_tools::builtins::slack::unescape_newlines;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

/// Shown before every line of input
pub const PROMPT: &str = "Enter your message: ";

/// Read questions until end of input or `exit`
pub async fn run(config: &AppConfig) -> Result<()> {
    let coordinator = build_coordinator(config, None, None).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        match answer(&coordinator, input).await {
            Ok(outcome) => println!("{}\n", final_answer(&outcome)),
            Err(e) => eprintln!("{}\n", format_error_for_chat(&e)),
        }
    }

    Ok(())
}

/// Answer one question and exit
pub async fn ask(config: &AppConfig, question: &str) -> Result<()> {
    let coordinator = build_coordinator(config, None, None).await?;
    match answer(&coordinator, question).await {
        Ok(outcome) => {
            println!("{}", final_answer(&outcome));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error_for_chat(&e));
            Err(e.into())
        }
    }
}

/// Dispatch `input`, printing each step as it is observed
pub async fn answer(
    dispatcher: &dyn Dispatcher,
    input: &str,
) -> kubepilot_core::Result<DispatchOutcome> {
    let bus = EventBus::default();
    let mut rx = bus.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(DispatchEvent::StepObserved {
                    log, observation, ..
                }) => println!("{}\nObservation: {}", log.trim(), observation),
                Ok(event) if event.is_terminal() => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    let result = dispatcher
        .dispatch(DispatchRequest::new(input).with_event_bus(bus))
        .await;
    let _ = printer.await;
    result
}

/// The answer text as a user should see it
pub fn final_answer(outcome: &DispatchOutcome) -> String {
    unescape_newlines(&outcome.output)
}
