//! 通知服务 - 业务能力层
//!
//! 只负责"把一条消息发出去"，消息内容由流程层决定

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::NotifyError;

/// 发送通知的能力
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot 通知
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, bot_id: &str, chat_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), bot_id),
            chat_id: chat_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.telegram_api_base,
            &config.telegram_bot_id,
            config.telegram_chat_id.clone(),
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        debug!("发送 Telegram 通知，长度: {} 字符", message.len());

        let payload = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "HTML",
        });

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Telegram 通知发送失败: HTTP {}", status);
            return Err(NotifyError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Telegram 通知发送成功");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_built_from_bot_id() {
        let notifier = TelegramNotifier::new("https://api.telegram.org/", "123:abc", "42");
        assert_eq!(
            notifier.endpoint,
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(notifier.chat_id, "42");
    }
}
