use std::env;

use chrono::{DateTime, Utc};

use versecast::overlay::{OverlayJob, OverlayTimelineBuilder, ParleyRasterizer, PngWriter};
use versecast::publish::TikTokClient;
use versecast::{
    Config, ContentRepo, DbVideoResolver, QueueProcessor, QueueRepo, QueueStatus, SettingsRepo,
    SystemClock,
};

use versecast::clock::Clock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!(
            "versecastctl <command>\n\
             Commands:\n\
             - init-db\n\
             - seed-demo\n\
             - schedule <video_id> <rfc3339>\n\
             - approve <queue_id>\n\
             - queue [status]\n\
             - process [--dry-run]\n\
             - sample-overlays <out_dir>\n\
             \n\
             Uses VERSECAST_DATABASE_URL or DATABASE_URL.\n"
        );
        std::process::exit(2);
    }

    let config = Config::from_env()?;

    match args[1].as_str() {
        "init-db" => {
            let pool = versecast::db::make_pool(&config.database_url).await?;
            versecast::db::run_migrations(&pool).await?;
            println!("migrations OK");
        }
        "seed-demo" => {
            let pool = versecast::db::make_pool(&config.database_url).await?;
            versecast::db::run_migrations(&pool).await?;
            seed_demo(&pool).await?;
        }
        "schedule" => {
            let video_id: i64 = args
                .get(2)
                .and_then(|s| s.parse().ok())
                .expect("usage: versecastctl schedule <video_id> <rfc3339>");
            let scheduled_at: DateTime<Utc> = args
                .get(3)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .expect("usage: versecastctl schedule <video_id> <rfc3339>");

            let pool = versecast::db::make_pool(&config.database_url).await?;
            let repo = QueueRepo::new(pool);
            let id = repo
                .enqueue(video_id, "tiktok", scheduled_at, Utc::now())
                .await?;
            println!("+ queued video {video_id} as queue item {id} (pending)");
        }
        "approve" => {
            let queue_id: i64 = args
                .get(2)
                .and_then(|s| s.parse().ok())
                .expect("usage: versecastctl approve <queue_id>");

            let pool = versecast::db::make_pool(&config.database_url).await?;
            let repo = QueueRepo::new(pool);
            if repo.approve(queue_id, Utc::now()).await? {
                println!("approved queue item {queue_id}");
            } else {
                println!("queue item {queue_id} was not pending; nothing changed");
            }
        }
        "queue" => {
            let status = args.get(2).map(|s| {
                QueueStatus::parse(s).unwrap_or_else(|| {
                    eprintln!("unknown status '{s}'");
                    std::process::exit(2);
                })
            });

            let pool = versecast::db::make_pool(&config.database_url).await?;
            let repo = QueueRepo::new(pool);
            for item in repo.list(status, 50).await? {
                println!(
                    "#{:<4} video={:<4} {:<10} scheduled={} retries={}{}",
                    item.id,
                    item.video_id,
                    item.status.as_str(),
                    item.scheduled_at.to_rfc3339(),
                    item.retry_count,
                    item.error_message
                        .as_deref()
                        .map(|e| format!(" error={e}"))
                        .unwrap_or_default(),
                );
            }
        }
        "process" => {
            let dry_run = args.iter().any(|a| a == "--dry-run");

            let pool = versecast::db::make_pool(&config.database_url).await?;
            versecast::db::run_migrations(&pool).await?;

            let repo = QueueRepo::new(pool.clone());
            let settings = SettingsRepo::new(pool.clone());
            let resolver = DbVideoResolver::new(pool.clone());
            let publisher = TikTokClient::new(config.tiktok_access_token.clone());

            let processor =
                QueueProcessor::new(repo, settings, resolver, publisher, SystemClock);

            if processor.gate().needs_human_approval().await? {
                eprintln!(
                    "note: still inside the manual-approval window; items must be approved by hand"
                );
            }

            let results = processor.process_queue(dry_run).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        "sample-overlays" => {
            let out_dir = args
                .get(2)
                .expect("usage: versecastctl sample-overlays <out_dir>");
            sample_overlays(&config, out_dir)?;
        }
        other => {
            eprintln!("Unknown command: {other}");
            std::process::exit(2);
        }
    }

    Ok(())
}

async fn seed_demo(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    let clock = SystemClock;
    let now = clock.now();

    let content = ContentRepo::new(pool.clone());
    let queue = QueueRepo::new(pool.clone());

    let theme_id = content
        .insert_theme("money-worry", "Money Worry", "comforting", now)
        .await?;
    let verse_id = content
        .insert_verse(
            "Philippians 4:19",
            "And my God will supply every need of yours according to \
             his riches in glory in Christ Jesus.",
            theme_id,
            now,
        )
        .await?;
    let prayer_id = content
        .insert_prayer(
            verse_id,
            theme_id,
            "Lord, You know the weight we carry when the bills stack up \
             and the numbers don't add up. We lay our financial fears at \
             Your feet today. Remind us that You are our provider, and \
             that no need is too great for Your abundant grace.",
            now,
        )
        .await?;
    let video_id = content
        .insert_video(prayer_id, "media/videos/demo.mp4", 62.0, now)
        .await?;

    let queue_id = queue.enqueue(video_id, "tiktok", now, now).await?;

    println!("+ seeded theme/verse/prayer chain, video {video_id}, queue item {queue_id}");
    Ok(())
}

fn sample_overlays(config: &Config, out_dir: &str) -> anyhow::Result<()> {
    let samples = [
        (
            "wedding-joy",
            "Is your child getting married soon?",
            "Jeremiah 29:11",
            "For I know the plans I have for you, declares the Lord, \
             plans for welfare and not for evil, to give you a future and a hope.",
            "Heavenly Father, we come before You today with hearts full of joy \
             and anticipation. As our children step into this sacred covenant of \
             marriage, we ask for Your blessing to rest upon them. Guide their \
             steps as they build a life together, rooted in Your love.",
        ),
        (
            "money-worry",
            "Are you feeling worried about money?",
            "Philippians 4:19",
            "And my God will supply every need of yours according to \
             his riches in glory in Christ Jesus.",
            "Lord, You know the weight we carry when the bills stack up \
             and the numbers don't add up. We lay our financial fears at \
             Your feet today. Remind us that You are our provider, and \
             that no need is too great for Your abundant grace.",
        ),
        (
            "purity-struggle",
            "Is what you're watching pulling you from God?",
            "Romans 12:2",
            "Do not be conformed to this world, but be transformed by the \
             renewal of your mind, that by testing you may discern what is \
             the will of God, what is good and acceptable and perfect.",
            "Father, we confess that the world's images and distractions \
             pull at our hearts. Give us the strength to turn away from \
             what dims Your light in us. Renew our minds and guard our \
             eyes, that we may see only what honors You.",
        ),
        (
            "loneliness",
            "Are you feeling lonely even around others?",
            "Psalm 34:18",
            "The Lord is near to the brokenhearted and saves the crushed in spirit.",
            "God, loneliness can feel like a room full of people and an \
             empty heart. But You promise to be near. Draw close to those \
             who ache for connection today. Let them feel Your presence \
             in the silence and know they are never truly alone.",
        ),
    ];

    let rasterizer = ParleyRasterizer::from_system_fonts(config.font_path.as_deref())?;
    let mut builder = OverlayTimelineBuilder::new(rasterizer, PngWriter, out_dir);

    for (slug, hook, verse_ref, verse_text, prayer) in samples {
        let job = OverlayJob::vertical(verse_ref, verse_text, prayer, slug, 60.0).with_hook(hook);
        let frames = builder.build(&job)?;
        println!("  {slug}: {} frames", frames.len());
    }

    println!("Done! Review samples in {out_dir}/");
    Ok(())
}
