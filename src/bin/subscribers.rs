use anyhow::bail;
use anyhow::Context;
use subscription_intake::configuration::get_configuration;
use subscription_intake::fallback_store::FallbackStore;
use subscription_intake::fallback_store::FileStorage;
use subscription_intake::telemetry::get_subscriber;
use subscription_intake::telemetry::init_subscriber;
use subscription_intake::widget::NoticeLevel;
use subscription_intake::widget::SubscriptionWidget;
use subscription_intake::widget::WidgetEvent;

const USAGE: &str = "usage: subscribers <subscribe EMAIL | list | export | clear --yes>";

/// Operator surface over the widget and its local fallback store, which
/// lives under `widget.storage_dir`.
///
/// ```sh
///     subscribers subscribe jane@example.com
///     subscribers export > subscribers.csv
/// ```
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // logs go to stderr so that `list`/`export` output stays clean
    let subscriber = get_subscriber("subscribers", "warn", std::io::stderr);
    init_subscriber(subscriber);

    let cfg = get_configuration().context("failed to load configuration")?;
    let storage = FileStorage::new(&cfg.widget.storage_dir);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["subscribe", email] => {
            let mut widget = SubscriptionWidget::new(&cfg.widget, storage);
            widget
                .handle(WidgetEvent::EmailInput(email.to_string()))
                .await;
            let notice = widget
                .handle(WidgetEvent::Submit)
                .await
                .context("submit produced no notice")?;
            println!("{}", notice.message);
            if notice.level == NoticeLevel::Error {
                bail!("subscription failed");
            }
        }
        ["list"] => {
            let records = FallbackStore::new(storage).list();
            println!("{}", serde_json::to_string_pretty(&records)?);
            eprintln!("Total subscribers: {}", records.len());
        }
        ["export"] => {
            let csv = FallbackStore::new(storage).export_csv();
            if csv.is_empty() {
                eprintln!("No subscribers to export.");
            }
            print!("{csv}");
        }
        ["clear", "--yes"] => {
            FallbackStore::new(storage).clear()?;
            println!("All subscribers cleared.");
        }
        ["clear"] => bail!("refusing to clear all subscribers without --yes; this cannot be undone"),
        _ => bail!(USAGE),
    }
    Ok(())
}
