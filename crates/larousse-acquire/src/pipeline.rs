use larousse_model::{AssetKind, EntryRequest, KindSummary, RunReport, SnapshotError};
use scraper::Html;

use crate::assemble;
use crate::config::SnapshotConfig;
use crate::events::Reporter;
use crate::extract;
use crate::localize::{self, AssetLocalizer};
use crate::neutralize;
use crate::output::OutputBundle;
use crate::render::PageRenderer;
use crate::resolve;

/// Snapshot one dictionary entry for offline reading.
///
/// Renders the entry page, isolates its content region, neutralizes links,
/// downloads stylesheets, scripts and audio into `<root>/<safe_name>/` and
/// writes `<safe_name>.html` pointing at the local copies. Progress is sent to
/// `reporter`; individual asset failures only produce warnings.
///
/// Fails without writing anything when rendering fails. When the page has no
/// entry, a placeholder document is written and [`SnapshotError::NoContent`]
/// is returned; no assets are downloaded in that case.
pub async fn run_entry(
    request: &EntryRequest,
    config: &SnapshotConfig,
    renderer: &dyn PageRenderer,
    reporter: &Reporter,
) -> Result<RunReport, SnapshotError> {
    let target = resolve::resolve(request, &config.origin);
    let bundle = OutputBundle::new(&config.root_dir, &target.safe_name);

    reporter.info(format!("Scraping {} from {}", target.display_name, target.fetch_url));

    let html = match renderer.render(&target.fetch_url).await {
        Ok(html) => html,
        Err(e) => {
            reporter.error(format!("Rendering failed: {e:#}"));
            return Err(SnapshotError::Render(format!("{e:#}")));
        }
    };
    let fetched_at = chrono::Utc::now().to_rfc3339();

    let mut document = Html::parse_document(&html);

    let Some(region) = extract::find_content_region(&document) else {
        bundle.write_html(&assemble::placeholder_document(&request.input))?;
        reporter.warn(format!(
            "No article found. Wrote placeholder: {}",
            bundle.html_file.display()
        ));
        return Err(SnapshotError::NoContent {
            url: target.fetch_url,
            placeholder: bundle.html_file,
        });
    };

    let links_neutralized = neutralize::neutralize_links(&mut document, region);

    let (css, js, audio) = {
        let localizer = AssetLocalizer::new(config, &bundle, reporter, &target.safe_name)
            .map_err(|e| SnapshotError::Http(format!("{e:#}")))?;

        reporter.info("Downloading CSS...");
        let css = localizer.localize(&mut document, AssetKind::Stylesheet, None).await;

        reporter.info("Downloading JS...");
        let js = localizer.localize(&mut document, AssetKind::Script, None).await;

        reporter.info("Downloading Audio...");
        let audio = localizer.localize(&mut document, AssetKind::Audio, Some(region)).await;

        (css, js, audio)
    };

    let css = KindSummary::from_refs(&css);
    let js = KindSummary::from_refs(&js);
    let audio = KindSummary::from_refs(&audio);

    let (linked, unmatched) = localize::link_speaker_icons(&mut document, region, &audio.local_paths);
    if linked + unmatched > 0 {
        tracing::debug!(linked, unmatched, "Linked speaker icons to audio");
    }

    let title = extract::page_title(&document)
        .unwrap_or_else(|| format!("Entry for {}", target.display_name));
    let final_html = assemble::assemble(&document, region, &title);
    bundle.write_html(&final_html)?;

    reporter.info(format!("Saved: {}", bundle.html_file.display()));
    reporter.info(format!("Audio: {} file(s) in {}", audio.localized, bundle.audio_dir.display()));
    reporter.info(format!("CSS: {} file(s) in {}", css.localized, bundle.css_dir.display()));
    reporter.info(format!("JS: {} file(s) in {}", js.localized, bundle.js_dir.display()));

    Ok(RunReport {
        target,
        fetched_at,
        html_file: bundle.html_file,
        css,
        js,
        audio,
        links_neutralized,
    })
}
