//! 轮询循环
//!
//! 每个间隔执行一个周期。上一周期的订单数作为显式状态在循环中传递。
//! 收到停止信号时立即结束等待；正在执行的周期直接放弃，不会发布一半的结果。

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info};

use crate::clients::message_source::MessageSource;
use crate::orchestrator::cycle::{run_cycle, CycleOutcome, ReportSink};
use crate::utils::logging;

/// 轮询器
pub struct Poller<S, K> {
    source: S,
    sink: K,
    interval: Duration,
}

/// 循环结束时的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// 已完成的周期数
    pub cycles: usize,
    /// 发布次数
    pub published: usize,
    /// 失败的周期数
    pub failed: usize,
    /// 最后一次成功周期的订单数
    pub last_count: usize,
}

/// 等待停止信号；发送端全部关闭后不会再有信号，一直等待
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl<S, K> Poller<S, K>
where
    S: MessageSource,
    K: ReportSink,
{
    pub fn new(source: S, sink: K, interval: Duration) -> Self {
        Self {
            source,
            sink,
            interval,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// 运行直到收到停止信号
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> PollSummary {
        let mut summary = PollSummary::default();
        let mut previous_count = 0usize;

        loop {
            if *shutdown.borrow() {
                break;
            }

            logging::log_cycle_start(summary.cycles + 1);
            let started = std::time::Instant::now();

            tokio::select! {
                biased;
                result = run_cycle(&self.source, &self.sink, previous_count) => {
                    summary.cycles += 1;
                    match result {
                        Ok(outcome) => {
                            if let CycleOutcome::Published { .. } = outcome {
                                summary.published += 1;
                                logging::log_cycle_published(&outcome, started.elapsed());
                            }
                            previous_count = outcome.baseline(previous_count);
                            summary.last_count = previous_count;
                        }
                        Err(e) => {
                            summary.failed += 1;
                            error!("❌ 本周期失败，等待下一周期: {}", e);
                        }
                    }
                }
                _ = wait_for_shutdown(&mut shutdown) => {
                    info!("收到停止信号，放弃当前周期");
                    break;
                }
            }

            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => break,
                _ = sleep(self.interval) => {}
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::message_source::Message;
    use crate::error::{AppError, AppResult, PublishError};
    use crate::orchestrator::cycle::tests::{message, FixedSource, RecordingSink, ORDER_HTML};
    use crate::orchestrator::cycle::CycleOutput;
    use std::cell::{Cell, RefCell};
    use tokio::sync::Notify;

    /// 每次取消息时按脚本返回，脚本用完后发出停止信号
    struct ScriptedSource {
        script: RefCell<Vec<Vec<Message>>>,
        stop: watch::Sender<bool>,
    }

    impl MessageSource for ScriptedSource {
        async fn fetch_messages(&self) -> AppResult<Vec<Message>> {
            let mut script = self.script.borrow_mut();
            let messages = script.remove(0);
            if script.is_empty() {
                let _ = self.stop.send(true);
            }
            Ok(messages)
        }
    }

    fn orders(n: usize) -> Vec<Message> {
        (0..n).map(|i| message(&i.to_string(), ORDER_HTML)).collect()
    }

    #[tokio::test]
    async fn test_publishes_only_on_growth() {
        let (tx, rx) = watch::channel(false);
        let source = ScriptedSource {
            script: RefCell::new(vec![orders(1), orders(1), orders(3), orders(2), orders(3)]),
            stop: tx,
        };
        let poller = Poller::new(source, RecordingSink::default(), Duration::from_millis(1));

        let summary = poller.run(rx).await;
        assert_eq!(summary.cycles, 5);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.last_count, 3);

        let counts: Vec<_> = poller
            .sink()
            .outputs
            .borrow()
            .iter()
            .map(|o| o.report.order_count)
            .collect();
        assert_eq!(counts, vec![1, 3]);
    }

    /// 第一次发布失败的输出端
    struct FlakySink {
        calls: Cell<usize>,
    }

    impl ReportSink for FlakySink {
        async fn publish(&self, _output: &CycleOutput) -> AppResult<()> {
            self.calls.set(self.calls.get() + 1);
            if self.calls.get() == 1 {
                return Err(AppError::Publish(PublishError::BadStatus {
                    endpoint: "wp".to_string(),
                    status: 502,
                }));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_cycle_is_retried_on_next_tick() {
        let (tx, rx) = watch::channel(false);
        let source = ScriptedSource {
            script: RefCell::new(vec![orders(2), orders(2)]),
            stop: tx,
        };
        let poller = Poller::new(source, FlakySink { calls: Cell::new(0) }, Duration::from_millis(1));

        let summary = poller.run(rx).await;
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.published, 1);
        assert_eq!(poller.sink().calls.get(), 2);
    }

    struct NotifyingSink {
        published: Notify,
    }

    impl ReportSink for NotifyingSink {
        async fn publish(&self, _output: &CycleOutput) -> AppResult<()> {
            self.published.notify_one();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_sleep() {
        let (tx, rx) = watch::channel(false);
        let poller = Poller::new(
            FixedSource(orders(1)),
            NotifyingSink {
                published: Notify::new(),
            },
            Duration::from_secs(3600),
        );

        let run = tokio::time::timeout(Duration::from_secs(5), poller.run(rx));
        let stop = async {
            poller.sink().published.notified().await;
            tx.send(true).unwrap();
        };
        let (summary, ()) = tokio::join!(run, stop);

        let summary = summary.expect("poller should stop without waiting out the interval");
        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.published, 1);
    }

    /// 永远取不回消息的消息源
    struct HangingSource;

    impl MessageSource for HangingSource {
        async fn fetch_messages(&self) -> AppResult<Vec<Message>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_shutdown_abandons_running_cycle() {
        let (tx, rx) = watch::channel(false);
        let poller = Poller::new(HangingSource, RecordingSink::default(), Duration::from_millis(1));

        let run = tokio::time::timeout(Duration::from_secs(5), poller.run(rx));
        let stop = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(true).unwrap();
        };
        let (summary, ()) = tokio::join!(run, stop);

        let summary = summary.unwrap();
        assert_eq!(summary.cycles, 0);
        assert!(poller.sink().outputs.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_already_stopped_runs_nothing() {
        let (_tx, rx) = watch::channel(true);
        let poller = Poller::new(FixedSource(orders(1)), RecordingSink::default(), Duration::from_millis(1));
        assert_eq!(poller.run(rx).await, PollSummary::default());
    }
}
