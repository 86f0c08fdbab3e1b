//! Telegram bot entrypoint: loads config, builds one [`PipelineController`]
//! for the configured character, and runs a teloxide REPL that forwards
//! every text message through it.

use std::sync::Arc;

use anyhow::Result;
use boundary::{BoundaryConfig, BoundaryManager};
use embedding::{EmbeddingService, LocalHashEmbedder};
use llm_client::{HttpExternalEmotionClient, LlmClient, OpenAiCompatibleLlmClient};
use memory::VectorMemoryStore;
use memory_inmemory::InMemoryVectorStore;
use openai_embedding::OpenAIEmbedding;
use orchestrator::{ExternalEmotionClient, IntelligenceOrchestrator};
use pipeline::{PipelineConfig, PipelineController};
use storage::KnowledgeStore;
use teloxide::prelude::*;
use telegram_bot::{reply_segments, to_platform_message, BotConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = BotConfig::load(None)?;
    config.validate()?;

    dbot_core::init_tracing(&config.base.log_file)?;
    info!(character = %config.character.name, "starting telegram bot");

    let persona = config.character.load_persona()?;

    let embedder: Arc<dyn EmbeddingService> = if config.embedding.should_use_external() {
        Arc::new(OpenAIEmbedding::from_config(&config.embedding))
    } else {
        warn!("USE_EXTERNAL_EMBEDDINGS not fully configured, falling back to the local hash embedder");
        Arc::new(LocalHashEmbedder::new())
    };

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleLlmClient::new(config.chat.clone()));
    if let Err(err) = llm.validate_startup().await {
        warn!(error = %err, "chat endpoint startup validation failed; continuing anyway");
    }

    let external_emotion: Option<Arc<dyn ExternalEmotionClient>> = config
        .emotion
        .clone()
        .map(|cfg| Arc::new(HttpExternalEmotionClient::new(cfg)) as Arc<dyn ExternalEmotionClient>);

    let orchestrator = Arc::new(IntelligenceOrchestrator::new(external_emotion));
    let knowledge_store = Arc::new(KnowledgeStore::new(&config.base.database_url).await?);
    let memory_store: Arc<dyn VectorMemoryStore> = Arc::new(InMemoryVectorStore::new());
    let boundary = Arc::new(BoundaryManager::new(BoundaryConfig::default()));

    let pipeline_config = PipelineConfig {
        character: config.character.name.clone(),
        reply_chunk_size: config.reply_chunk_size,
        global_turn_deadline: config.global_turn_deadline,
        ..Default::default()
    };

    let controller = Arc::new(PipelineController::new(
        pipeline_config,
        persona,
        boundary,
        memory_store,
        knowledge_store,
        embedder,
        orchestrator,
        llm,
    ));

    let bot = {
        let bot = Bot::new(config.base.bot_token.clone());
        match &config.base.telegram_api_url {
            Some(url_str) => match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(err) => {
                    warn!(error = %err, url = %url_str, "invalid TELEGRAM_API_URL, using the default endpoint");
                    bot
                }
            },
            None => bot,
        }
    };

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let controller = controller.clone();
        async move {
            let Some(platform_msg) = to_platform_message(&msg) else {
                return Ok(());
            };

            let (reply, outcome) = controller.process_message(&platform_msg).await;
            info!(chat_id = %msg.chat.id, outcome = ?outcome, "turn processed");

            for chunk in reply_segments(&reply) {
                if let Err(err) = bot.send_message(msg.chat.id, chunk).await {
                    error!(error = %err, chat_id = %msg.chat.id, "failed to send reply chunk");
                }
            }

            respond(())
        }
    })
    .await;

    Ok(())
}
