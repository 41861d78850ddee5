/// WordPress 发布客户端
///
/// 把公开统计页面的 HTML 写入指定文章
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, PublishError};

/// WordPress 客户端
pub struct WordpressClient {
    client: Client,
    base_url: String,
    post_id: String,
    user: String,
    password: String,
}

impl WordpressClient {
    /// 创建新的 WordPress 客户端
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.wp_url.clone(),
            post_id: config.wp_postid.clone(),
            user: config.wp_user.clone(),
            password: config.wp_pass.clone(),
        }
    }

    /// 文章接口地址（基础地址直接拼接文章 ID）
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.post_id)
    }

    /// 请求体
    pub fn build_payload(content: &str) -> Value {
        json!({ "content": content })
    }

    /// 更新文章内容
    ///
    /// # 返回
    /// 返回 HTTP 状态码
    pub async fn update_post(&self, content: &str) -> AppResult<u16> {
        let endpoint = self.endpoint();
        debug!("发布统计页面: {} ({} 字节)", endpoint, content.len());

        let response = self
            .client
            .post(&endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(&Self::build_payload(content))
            .send()
            .await
            .map_err(|e| AppError::publish_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Publish(PublishError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }));
        }

        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_and_payload() {
        let config = Config {
            wp_url: "https://example.org/wp-json/wp/v2/posts/".to_string(),
            wp_postid: "42".to_string(),
            ..Config::default()
        };
        let client = WordpressClient::new(&config);
        assert_eq!(client.endpoint(), "https://example.org/wp-json/wp/v2/posts/42");
        assert_eq!(
            WordpressClient::build_payload("<p>x</p>"),
            json!({ "content": "<p>x</p>" })
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_publish_error() {
        let config = Config {
            wp_url: "http://127.0.0.1:9/".to_string(),
            wp_postid: "1".to_string(),
            ..Config::default()
        };
        let err = WordpressClient::new(&config).update_post("x").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Publish(PublishError::RequestFailed { .. })
        ));
    }
}
