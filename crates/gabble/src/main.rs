//! A Discord bot that bridges chat threads with an OpenAI-compatible
//! completion endpoint. `/chat <prompt>` opens a thread seeded with the
//! prompt; every message in the thread then gets an LLM reply.

#[macro_use]
extern crate tracing;

mod discord;

use std::env;
use std::sync::{Arc, OnceLock};

use gabble_core::{Bot, BotConfig, MessageEvent};
use gabble_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use gabble_platform::Invocation;
use serenity::async_trait;
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{Command, CommandOptionType, Interaction};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::prelude::*;

use discord::DiscordPlatform;

const COMMAND_NAME: &str = "chat";
const PROMPT_OPTION: &str = "dialogue_prompt";

struct Handler {
    provider: OpenAIProvider,
    thread_name: String,
    system_prompt_suffix: String,
    max_history: u8,
    self_id: OnceLock<String>,
}

impl Handler {
    /// Builds the bot service for one event. Returns `None` until the
    /// gateway has told us who we are.
    fn bot(&self, ctx: &Context) -> Option<Bot<DiscordPlatform, OpenAIProvider>> {
        let self_id = self.self_id.get()?;
        let mut config = BotConfig::new(self_id.clone());
        config.thread_name = self.thread_name.clone();
        config.system_prompt_suffix = self.system_prompt_suffix.clone();
        config.max_history = self.max_history;
        Some(Bot::new(
            DiscordPlatform::new(Arc::clone(&ctx.http)),
            self.provider.clone(),
            config,
        ))
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.self_id.set(ready.user.id.to_string()).ok();

        let command = CreateCommand::new(COMMAND_NAME)
            .description("Start a chat thread from a prompt")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    PROMPT_OPTION,
                    "The prompt for the conversation, this will set the \
                     behavior of the bot",
                )
                .required(true),
            );
        if let Err(err) = Command::create_global_command(&ctx.http, command).await
        {
            error!("cannot create command: {err}");
            return;
        }
        info!("bot is now ready");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };
        let Some(bot) = self.bot(&ctx) else {
            return;
        };
        let event = MessageEvent {
            channel_id: msg.channel_id.to_string(),
            guild_id: guild_id.to_string(),
            author_id: msg.author.id.to_string(),
        };
        bot.handle_message(&event).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        if command.data.name != COMMAND_NAME {
            return;
        }
        let Some(guild_id) = command.guild_id else {
            return;
        };
        let Some(prompt) = command
            .data
            .options
            .first()
            .and_then(|option| option.value.as_str())
        else {
            error!("missing {PROMPT_OPTION} option in command");
            return;
        };
        let Some(bot) = self.bot(&ctx) else {
            return;
        };

        let invocation = Invocation {
            id: command.id.to_string(),
            token: command.token.clone(),
            channel_id: command.channel_id.to_string(),
            guild_id: guild_id.to_string(),
            user_id: command.user.id.to_string(),
            prompt: prompt.to_owned(),
        };
        bot.handle_invocation(&invocation).await;
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = env::var("OPENAI_API_KEY") else {
        eprintln!("OPENAI_API_KEY environment variable is not set");
        return;
    };
    let Ok(api_base) = env::var("OPENAI_API_BASE") else {
        eprintln!("OPENAI_API_BASE environment variable is not set");
        return;
    };
    let Ok(token) = env::var("DISCORD_BOT_TOKEN") else {
        eprintln!("DISCORD_BOT_TOKEN environment variable is not set");
        return;
    };

    let mut provider_config = OpenAIConfigBuilder::with_api_key(api_key)
        .with_base_url(api_base);
    if let Ok(model) = env::var("MODEL") {
        provider_config = provider_config.with_model(model);
    }
    let provider = OpenAIProvider::new(provider_config.build());

    let handler = Handler {
        provider,
        thread_name: env::var("THREAD_NAME")
            .unwrap_or_else(|_| "GPT Chat Thread".to_owned()),
        system_prompt_suffix: env::var("SYSTEM_PROMPT_SUFFIX").unwrap_or_else(
            |_| "Your name is {name}, reply back to the user.".to_owned(),
        ),
        max_history: env::var("MAX_MESSAGES_LENGTH")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(100),
        self_id: OnceLock::new(),
    };

    let client = Client::builder(&token, GatewayIntents::non_privileged())
        .event_handler(handler)
        .await;
    let mut client = match client {
        Ok(client) => client,
        Err(err) => {
            eprintln!("error creating client: {err}");
            return;
        }
    };

    info!("config loaded, connecting to the gateway");
    if let Err(err) = client.start().await {
        error!("client error: {err}");
    }
}
