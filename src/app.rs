use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::clients::{FolderSource, WordpressClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::orchestrator::{CycleOutput, Poller, ReportSink};
use crate::services::{render_public_html, ReportWriter};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        if config.publish_enabled && (config.wp_url.is_empty() || config.wp_postid.is_empty()) {
            anyhow::bail!("已开启发布，但 WP_URL / WP_POSTID 未配置");
        }

        Ok(Self { config })
    }

    /// 运行轮询直到收到 Ctrl-C
    pub async fn run(&self) -> Result<()> {
        let source = FolderSource::new(&self.config.message_folder, &self.config.message_subject);
        let pipeline = ReportPipeline::from_config(&self.config);
        let poller = Poller::new(source, pipeline, self.config.poll_interval());

        let (stop_tx, stop_rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("收到 Ctrl-C");
                    let _ = stop_tx.send(true);
                }
                Err(e) => error!("无法监听 Ctrl-C: {}", e),
            }
        });

        let summary = poller.run(stop_rx).await;
        logging::log_shutdown(summary.cycles, summary.published, summary.failed);

        if summary.cycles > 0 && summary.cycles == summary.failed {
            anyhow::bail!("所有 {} 个周期均失败，请检查消息目录和发布配置", summary.failed);
        }

        Ok(())
    }
}

/// 周期输出管线：报表文件 → 订单单据 → 公开页面
pub struct ReportPipeline {
    writer: ReportWriter,
    publisher: Option<WordpressClient>,
}

impl ReportPipeline {
    pub fn new(writer: ReportWriter, publisher: Option<WordpressClient>) -> Self {
        Self { writer, publisher }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut writer = ReportWriter::new(&config.report_file);
        if let Some(path) = config.slip_file() {
            writer = writer.with_slip_file(path);
        }
        let publisher = config.publish_enabled.then(|| WordpressClient::new(config));
        Self::new(writer, publisher)
    }
}

impl ReportSink for ReportPipeline {
    async fn publish(&self, output: &CycleOutput) -> AppResult<()> {
        self.writer.write_report(&output.report).await?;
        self.writer.write_slips(&output.orders).await?;

        match &self.publisher {
            Some(client) => {
                let html = render_public_html(&output.report, &chrono::Local::now());
                let status = client.update_post(&html).await?;
                info!("🌐 统计页面已发布 (HTTP {})", status);
            }
            None => warn!("⚠️ 未开启发布，只写入本地报表"),
        }
        Ok(())
    }
}
