//! REPL runner: converts teloxide messages to core messages and hands them to the HandlerChain.

use anyhow::{Context, Result};
use dbot_core::ToCoreMessage;
use handler_chain::HandlerChain;
use teloxide::{prelude::*, types::BotCommand};
use tracing::{error, info, instrument};

use super::adapters::TelegramMessageWrapper;

/// Publishes the bot's command list (name, description) so clients can offer completion.
pub async fn register_commands(bot: &teloxide::Bot, commands: &[(&str, &str)]) -> Result<()> {
    let commands: Vec<BotCommand> = commands
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect();
    bot.set_my_commands(commands)
        .await
        .context("Failed to register bot commands")?;
    Ok(())
}

/// Registers `commands`, then runs the REPL. Each message is converted to a core message and
/// handled by the chain in its own task, so chats proceed independently.
#[instrument(skip(bot, handler_chain, commands))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    commands: &[(&str, &str)],
) -> Result<()> {
    if let Err(e) = register_commands(&bot, commands).await {
        error!(error = %e, "Command registration failed; continuing");
    } else {
        info!(count = commands.len(), "Bot commands registered");
    }

    let chain = handler_chain;
    teloxide::repl(
        bot,
        move |_bot: Bot, msg: teloxide::types::Message| {
            let chain = chain.clone();

            async move {
                let core_msg = TelegramMessageWrapper(&msg).to_core();
                info!(
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    message_type = %core_msg.message_type,
                    text_len = core_msg.content.len(),
                    "Received message"
                );

                tokio::spawn(async move {
                    info!(
                        user_id = core_msg.user.id,
                        chat_id = core_msg.chat.id,
                        message_id = %core_msg.id,
                        "step: processing message (handler chain started)"
                    );
                    if let Err(e) = chain.handle(&core_msg).await {
                        error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                    }
                });

                Ok(())
            }
        },
    )
    .await;

    Ok(())
}
