//! One-shot commands.

use std::time::Instant;

use anyhow::Context;
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use mtcam::api::{parse_date, ApiClient, MountainApi};
use mtcam::config::Settings;
use mtcam::controllers::{Scheduler, TimelapseController};
use mtcam::render::templates::weather_page;
use mtcam::render::text::{catalog_listing, info_box, scrape_table};
use mtcam::render::{camera_box, mountain_box, stats_box};
use mtcam::services::Session;

use crate::Selection;

fn client(settings: &Settings) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::with_user_agent(
        &settings.base_url,
        settings.timeout(),
        settings.user_agent.as_deref(),
    )?)
}

/// Load the catalog and apply the command-line selection to a fresh session.
async fn open_session(
    api: &ApiClient,
    settings: &Settings,
    selection: &Selection,
) -> anyhow::Result<Session> {
    let mut session = Session::new(settings, Local::now().date_naive())?;
    let catalog = api.catalog().await.context("loading mountains")?;
    session.apply_catalog(catalog);

    if let Some(id) = selection.mountain {
        session.select_mountain(id)?;
    }
    if let Some(id) = selection.cam {
        session.select_camera(id)?;
    }
    if let Some(ref start) = selection.start {
        session.set_start(parse_date(start)?);
    }
    if let Some(ref end) = selection.end {
        session.set_end(parse_date(end)?);
    }
    if selection.local_time && !session.as_local_time() {
        session.toggle_local_time();
    }
    Ok(session)
}

/// Request the scrape log for the session's selection.
async fn load_scrapes(api: &ApiClient, session: &mut Session) -> anyhow::Result<()> {
    let query = session.submit_photos(Instant::now())?;
    let records = api.scrapes(&query).await.context("loading scrapes")?;
    session.apply_scrapes(records);
    Ok(())
}

pub async fn mountains(settings: &Settings) -> anyhow::Result<()> {
    let api = client(settings)?;
    let catalog = api.catalog().await.context("loading mountains")?;
    if catalog.is_empty() {
        println!("No mountains configured");
        return Ok(());
    }
    print!("{}", catalog_listing(&catalog));
    Ok(())
}

pub async fn scrapes(settings: &Settings, selection: &Selection, json: bool) -> anyhow::Result<()> {
    let api = client(settings)?;
    let mut session = open_session(&api, settings, selection).await?;
    load_scrapes(&api, &mut session).await?;
    let records = session.scrapes().unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if let Some(mountain) = session.mountain() {
        println!("{}", info_box(&mountain_box(mountain)));
    }
    if let Some(camera) = session.camera() {
        println!("{}", info_box(&camera_box(camera)));
    }
    if let Some(stats) = session.stats() {
        println!("{}", info_box(&stats_box(stats)));
    }
    if records.is_empty() {
        println!("{}", style("No scrapes in this range").dim());
    } else {
        print!("{}", scrape_table(records, session.frame_base()));
    }
    Ok(())
}

/// Play the timelapse on stdout with the same controller and scheduler the
/// terminal UI uses, driven by real timers.
pub async fn timelapse(
    settings: &Settings,
    selection: &Selection,
    cycles: Option<usize>,
) -> anyhow::Result<()> {
    let api = client(settings)?;
    let mut session = open_session(&api, settings, selection).await?;
    load_scrapes(&api, &mut session).await?;

    let frames = session.timelapse().len();
    if frames == 0 {
        println!("no images");
        return Ok(());
    }
    info!(
        "playing {} frames at {} fps",
        frames,
        session.timelapse().frames_per_second()
    );

    let bar = ProgressBar::new(frames as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} {msg}",
    )?);

    let mut scheduler = Scheduler::new();
    let limit = cycles.map(|c| c * frames);
    scheduler.arm(session.timelapse_mut().toggle_play(), Instant::now());
    let mut steps = 1;
    show_frame(&bar, session.timelapse());

    loop {
        if limit.is_some_and(|limit| steps >= limit) {
            break;
        }
        let Some(due) = scheduler.next_due() else {
            break;
        };
        tokio::select! {
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(due)) => {
                steps += scheduler.fire_due(session.timelapse_mut(), Instant::now());
                show_frame(&bar, session.timelapse());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    bar.finish();
    Ok(())
}

fn show_frame(bar: &ProgressBar, timelapse: &TimelapseController) {
    if let (Some(index), Some(frame)) = (timelapse.current_index(), timelapse.current_frame()) {
        bar.set_position(index as u64 + 1);
        bar.set_message(format!("{}  {}", frame.time, frame.url));
    }
}

pub async fn weather(settings: &Settings, selection: &Selection) -> anyhow::Result<()> {
    let api = client(settings)?;
    let session = open_session(&api, settings, selection).await?;
    let query = session.weather_query()?;
    let embed = api.weather(&query).await.context("loading weather")?;

    let title = session
        .mountain()
        .map(|m| format!("{} weather", m.label()))
        .unwrap_or_else(|| "Weather".to_string());
    let output = &settings.weather_output;
    std::fs::write(output, weather_page(&title, &embed))
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "{} {}",
        style("Weather plot written to").green(),
        output.display()
    );
    Ok(())
}
