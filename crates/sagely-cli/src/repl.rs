//! Main chat loop orchestration.
//!
//! Renders history after activation, then multiplexes between user input
//! and state updates from the core: messages and side-channel changes
//! arrive over the update bus whether they came from the bootstrap fetch,
//! the push channel, or the send path, and each is rendered exactly once.

use console::style;
use tokio::sync::broadcast;

use sagely_core::chat::ChatUpdate;
use sagely_types::learning::{Lesson, LearningTarget};
use sagely_types::message::Message;
use sagely_types::session::Session;

use crate::commands::{self, ChatCommand};
use crate::input::{ChatInput, InputEvent};
use crate::Service;

const ASSISTANT_NAME: &str = "Sage";

/// Run the interactive chat loop until EOF or `/exit`.
pub async fn run(service: &Service) -> anyhow::Result<()> {
    let session = service
        .init()
        .await
        .map_err(|err| anyhow::anyhow!("could not start a session: {err}"))?;

    print_banner(&session);
    for message in service.state().messages() {
        print_message(&message);
    }
    let targets = service.state().targets();
    if !targets.is_empty() {
        print_targets(&targets);
    }
    println!();

    let prompt = format!("  {} ", style("You >").green().bold());
    let thinking_prompt = format!("  {} ", style("... >").dim());
    let (mut input, _writer) = ChatInput::new(prompt.clone())
        .map_err(|err| anyhow::anyhow!("failed to initialize input: {err}"))?;
    let mut updates = service.updates();

    enum Turn {
        Update(Result<ChatUpdate, broadcast::error::RecvError>),
        Input(InputEvent),
    }

    loop {
        // Keep the prompt in sync with the thinking indicator.
        input.update_prompt(if service.state().thinking() {
            &thinking_prompt
        } else {
            &prompt
        });

        let turn = tokio::select! {
            update = updates.recv() => Turn::Update(update),
            event = input.read_line() => Turn::Input(event),
        };

        match turn {
            Turn::Update(Ok(update)) => render_update(&update),
            Turn::Update(Err(broadcast::error::RecvError::Lagged(skipped))) => {
                tracing::warn!(skipped, "display lagged behind updates");
            }
            Turn::Update(Err(broadcast::error::RecvError::Closed)) => break,
            Turn::Input(InputEvent::Eof) => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            Turn::Input(InputEvent::Interrupted) => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
            }
            Turn::Input(InputEvent::Line(text)) => {
                if text.is_empty() {
                    continue;
                }
                if let Some(command) = commands::parse(&text) {
                    if handle_command(service, &mut input, command) {
                        break;
                    }
                    continue;
                }
                // Awaiting the send here is the input-disable discipline:
                // the prompt is not polled again until the call settles, so
                // at most one send is in flight.
                if let Err(err) = service.send(&text).await {
                    tracing::debug!(error = %err, "send failed");
                    // The failure handler owns the reset.
                    service.set_thinking(false);
                }
            }
        }
    }

    service.close();
    Ok(())
}

/// Returns true when the loop should exit.
fn handle_command(service: &Service, input: &mut ChatInput, command: ChatCommand) -> bool {
    match command {
        ChatCommand::Help => commands::print_help(),
        ChatCommand::Targets => {
            let targets = service.state().targets();
            if targets.is_empty() {
                println!("\n  {}\n", style("No learning targets yet.").dim());
            } else {
                print_targets(&targets);
                println!();
            }
        }
        ChatCommand::Lessons => {
            let lessons = service.state().lessons();
            if lessons.is_empty() {
                println!("\n  {}\n", style("No recent lessons.").dim());
            } else {
                println!();
                for lesson in &lessons {
                    print_lesson(lesson);
                }
                println!();
            }
        }
        ChatCommand::Points => {
            println!(
                "\n  {} {} wisdom points\n",
                style("*").yellow().bold(),
                service.state().wisdom_points()
            );
        }
        ChatCommand::Clear => input.clear(),
        ChatCommand::Exit => {
            println!("\n  {}", style("Session ended.").dim());
            return true;
        }
        ChatCommand::Unknown(name) => {
            println!(
                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(name).dim()
            );
        }
    }
    false
}

fn render_update(update: &ChatUpdate) {
    match update {
        ChatUpdate::MessageAppended(message) => print_message(message),
        ChatUpdate::TargetAdded(target) => {
            println!(
                "  {} new target: {} ({}%)",
                style("+").cyan(),
                style(&target.topic_name).bold(),
                target.proficiency.round()
            );
        }
        ChatUpdate::TargetUpdated(target) => {
            println!(
                "  {} {} is now at {}%",
                style("~").cyan(),
                style(&target.topic_name).bold(),
                target.proficiency.round()
            );
        }
        ChatUpdate::LessonRecorded(lesson) => print_lesson(lesson),
        ChatUpdate::WisdomPoints(points) => {
            println!("  {} {points} wisdom points", style("*").yellow().bold());
        }
        ChatUpdate::Thinking(true) => {
            println!("  {}", style(format!("{ASSISTANT_NAME} is thinking...")).dim());
        }
        ChatUpdate::Thinking(false) => {}
    }
}

fn print_banner(session: &Session) {
    println!();
    println!(
        "  {} {}",
        style("Sagely").cyan().bold(),
        style("learning companion").dim()
    );
    println!("  {}", style(format!("session {}", session.id)).dim());
    if session.wisdom_points > 0 {
        println!(
            "  {} {} wisdom points",
            style("*").yellow().bold(),
            session.wisdom_points
        );
    }
    println!();
}

fn print_message(message: &Message) {
    let label = if message.is_human {
        style("You >".to_string()).green().bold()
    } else {
        style(format!("{ASSISTANT_NAME} >")).cyan().bold()
    };
    println!("  {label} {}", message.text);
}

fn print_targets(targets: &[LearningTarget]) {
    println!("\n  {}", style("Learning targets").bold());
    for target in targets {
        println!(
            "  {} {} {}%",
            style("-").dim(),
            target.topic_name,
            target.proficiency.round()
        );
    }
}

fn print_lesson(lesson: &Lesson) {
    println!(
        "  {} {}: {}",
        style("#").magenta(),
        style(&lesson.title).bold(),
        style(&lesson.summary).dim()
    );
}
