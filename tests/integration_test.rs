use herbstfest_orders::clients::FolderSource;
use herbstfest_orders::orchestrator::{run_cycle, CycleOutcome, CycleOutput, Poller};
use herbstfest_orders::services::ReportWriter;
use herbstfest_orders::{AppResult, MessageSource, ReportPipeline, ReportSink, ViewName};
use std::path::Path;
use std::time::Duration;
use tokio::sync::{watch, Notify};

struct OrderMail<'a> {
    preparation: &'a str,
    pieces_onion: u32,
    trays_onion: u32,
    pieces_flame: u32,
    trays_flame: u32,
    sweet: &'a str,
    fulfillment: &'a str,
    day: &'a str,
    slot: &'a str,
}

impl Default for OrderMail<'_> {
    fn default() -> Self {
        Self {
            preparation: "Vorgebacken",
            pieces_onion: 0,
            trays_onion: 0,
            pieces_flame: 0,
            trays_flame: 0,
            sweet: "keiner",
            fulfillment: "Abholung",
            day: "Samstag",
            slot: "17:00",
        }
    }
}

impl OrderMail<'_> {
    fn render(&self) -> String {
        format!(
            "From: shop@example.org\r\nSubject: Neue Bestellung Herbstfest\r\n\r\n\
             <html><body><table>\
             <tr><td>Bestellung</td><td></td></tr>\
             <tr><td>Datum</td><td>04.10.2021</td></tr>\
             <tr><td>Art</td><td>{}</td></tr>\
             <tr><td>St&uuml;ck Zwiebel</td><td>{}</td></tr>\
             <tr><td>Blech Zwiebel</td><td>{}</td></tr>\
             <tr><td>St&uuml;ck Flamm</td><td>{}</td></tr>\
             <tr><td>Blech Flamm</td><td>{}</td></tr>\
             <tr><td>Neuer S&uuml;&szlig;er</td><td>{}</td></tr>\
             <tr><td colspan=\"2\">Abholung</td></tr>\
             <tr><td>Abholung/Lieferung</td><td>{}</td></tr>\
             <tr><td>Tag</td><td>{}</td></tr>\
             <tr><td>Uhrzeit</td><td>{}</td></tr>\
             <tr><td colspan=\"2\">Kontakt</td></tr>\
             <tr><td>Vorname</td><td>Erika</td></tr>\
             <tr><td>Name</td><td>Mustermann</td></tr>\
             <tr><td>E-Mail</td><td>erika@example.org</td></tr>\
             <tr><td>Telefon</td><td>0171 1234567</td></tr>\
             <tr><td>Adresse</td><td>Hauptstra&szlig;e 1</td></tr>\
             </table></body></html>",
            self.preparation,
            self.pieces_onion,
            self.trays_onion,
            self.pieces_flame,
            self.trays_flame,
            self.sweet,
            self.fulfillment,
            self.day,
            self.slot,
        )
    }
}

fn write_mail(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).expect("写入测试邮件失败");
}

fn pipeline(dir: &Path) -> ReportPipeline {
    let writer = ReportWriter::new(dir.join("report.json").to_string_lossy())
        .with_slip_file(dir.join("slips.txt").to_string_lossy());
    ReportPipeline::new(writer, None)
}

fn read_report(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join("report.json")).expect("报表文件应该存在");
    serde_json::from_str(&content).expect("报表应该是合法 JSON")
}

#[tokio::test]
async fn test_folder_to_report_end_to_end() {
    let mail_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();

    // 同一时段两单各 5 块：按单取整是 2 盘，汇总后取整是 ceil(10/9) = 2
    let five = OrderMail {
        pieces_onion: 5,
        ..OrderMail::default()
    };
    write_mail(mail_dir.path(), "001.eml", &five.render());
    write_mail(mail_dir.path(), "002.eml", &five.render());
    // 周六另一时段 4 块：按天合计 14 → 2 盘，而不是 2 + 1 = 3 盘
    write_mail(
        mail_dir.path(),
        "003.eml",
        &OrderMail {
            pieces_onion: 4,
            slot: "18:00",
            sweet: "2 Liter",
            ..OrderMail::default()
        }
        .render(),
    );
    write_mail(
        mail_dir.path(),
        "004.eml",
        &OrderMail {
            preparation: "Fertig gebacken",
            trays_flame: 1,
            day: "Sonntag",
            slot: "12:00",
            fulfillment: "Lieferung",
            sweet: "3 Liter",
            ..OrderMail::default()
        }
        .render(),
    );
    // 无法提取的记录被丢弃，不计入订单数
    write_mail(mail_dir.path(), "005.eml", "Subject: Herbstfest\r\n\r\n<p>kein Tisch</p>");
    // 主题不匹配的邮件直接跳过
    write_mail(mail_dir.path(), "006.eml", "Subject: Newsletter\r\n\r\nhallo");
    // 非邮件文件
    write_mail(mail_dir.path(), "notes.md", "ignore me");

    let source = FolderSource::new(mail_dir.path(), "Herbstfest");
    assert_eq!(source.fetch_messages().await.unwrap().len(), 5);

    let sink = pipeline(out_dir.path());
    let outcome = run_cycle(&source, &sink, 0).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Published { count: 4, dropped: 1 });

    let report = read_report(out_dir.path());
    assert_eq!(report[ViewName::AllOrders.as_str()]["rows"].as_array().unwrap().len(), 4);

    let by_day = &report[ViewName::TraySummaryByDay.as_str()];
    assert_eq!(by_day["columns"][0], "day");
    assert_eq!(by_day["rows"][0][0], "Saturday");
    assert_eq!(by_day["rows"][0][2], 2);
    assert_eq!(by_day["rows"][1][0], "Sunday");
    assert_eq!(by_day["rows"][1][3], 1);

    let totals = &report[ViewName::TotalTrays.as_str()]["rows"][0];
    assert_eq!(totals[0], 2);
    assert_eq!(totals[1], 1);
    assert_eq!(totals[2], 3);

    let sweet = &report[ViewName::TotalSweetLiter.as_str()]["rows"][0];
    assert_eq!(sweet[1], 1);
    assert_eq!(sweet[2], 1);
    assert_eq!(sweet[4], 5);

    let alarm = &report[ViewName::AlarmRanking.as_str()]["rows"];
    assert_eq!(alarm[0][1], "17:00");
    assert_eq!(alarm[0][3], 2);

    let slips = std::fs::read_to_string(out_dir.path().join("slips.txt")).unwrap();
    assert!(slips.contains("Hauptstraße 1"));

    // 没有新邮件：不再发布
    std::fs::remove_file(out_dir.path().join("report.json")).unwrap();
    let again = run_cycle(&source, &sink, outcome.baseline(0)).await.unwrap();
    assert_eq!(again, CycleOutcome::Unchanged { count: 4, dropped: 1 });
    assert!(!out_dir.path().join("report.json").exists());
}

#[tokio::test]
async fn test_empty_folder_produces_no_report() {
    let mail_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let source = FolderSource::new(mail_dir.path(), "Herbstfest");
    let sink = pipeline(out_dir.path());

    let outcome = run_cycle(&source, &sink, 0).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Unchanged { count: 0, dropped: 0 });
    assert!(!out_dir.path().join("report.json").exists());
}

#[tokio::test]
async fn test_missing_folder_fails_cycle() {
    let out_dir = tempfile::tempdir().unwrap();
    let source = FolderSource::new(out_dir.path().join("gibt-es-nicht"), "Herbstfest");
    let sink = pipeline(out_dir.path());
    assert!(run_cycle(&source, &sink, 0).await.is_err());
}

/// 发布完成后发出通知
struct NotifyingPipeline {
    inner: ReportPipeline,
    published: Notify,
}

impl ReportSink for NotifyingPipeline {
    async fn publish(&self, output: &CycleOutput) -> AppResult<()> {
        self.inner.publish(output).await?;
        self.published.notify_one();
        Ok(())
    }
}

#[tokio::test]
async fn test_poller_stops_on_signal() {
    let mail_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_mail(
        mail_dir.path(),
        "001.eml",
        &OrderMail {
            pieces_flame: 18,
            ..OrderMail::default()
        }
        .render(),
    );

    let poller = Poller::new(
        FolderSource::new(mail_dir.path(), "Herbstfest"),
        NotifyingPipeline {
            inner: pipeline(out_dir.path()),
            published: Notify::new(),
        },
        Duration::from_secs(3600),
    );
    let (tx, rx) = watch::channel(false);

    let stop = async {
        poller.sink().published.notified().await;
        tx.send(true).unwrap();
    };
    let (summary, ()) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(10), poller.run(rx)),
        stop
    );

    let summary = summary.expect("收到停止信号后应立即结束");
    assert_eq!(summary.cycles, 1);
    assert_eq!(summary.published, 1);
    assert_eq!(summary.last_count, 1);

    let report = read_report(out_dir.path());
    assert_eq!(report[ViewName::TotalTrays.as_str()]["rows"][0][1], 2);
}
