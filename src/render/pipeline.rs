use rayon::prelude::*;

use crate::assets::resolve::{ImageResolver, ResolvedImages};
use crate::compose::layouts::PageCompositor;
use crate::compose::planner::{PagePlan, plan};
use crate::config::JournalConfig;
use crate::document::assemble::{JournalDocument, PageRaster, assemble};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{KeepsakeError, KeepsakeResult};
use crate::model::JournalRequest;
use crate::render::cpu::{PageRgba, Rasterizer, RenderAssets};

/// Produce a complete journal for `request`.
///
/// Pipeline:
/// 1. validate the request and config
/// 2. resolve every photo (concurrently, failures become placeholders)
/// 3. [`plan`] the pages
/// 4. compose and rasterize each page, concurrently unless `threading.parallel` is off
/// 5. [`assemble`] the PDF in plan order
///
/// `cancel` is checked before each fetch and before each page.
#[tracing::instrument(skip_all, fields(event = %request.event_name, photos = request.photos.len()))]
pub fn generate_journal(
    request: &JournalRequest,
    cfg: &JournalConfig,
    cancel: &CancelToken,
) -> KeepsakeResult<JournalDocument> {
    request.validate()?;
    cfg.validate()?;

    let pool = build_thread_pool(cfg.threading.threads)?;
    let assets = RenderAssets::load(cfg)?;
    let resolver = ImageResolver::new(cfg);
    let images = pool.install(|| resolver.resolve(&request.photos, cancel))?;

    let plans = plan(&request.photos);
    let compositor = PageCompositor::new(cfg, request);
    let render_page = |rasterizer: &mut Rasterizer, p: &PagePlan| -> KeepsakeResult<PageRaster> {
        cancel.check()?;
        let visual = compositor.compose(p, &request.photos, &images)?;
        rasterizer.rasterize(&visual)
    };

    let rendered: Vec<KeepsakeResult<PageRaster>> = if cfg.threading.parallel {
        pool.install(|| {
            plans
                .par_iter()
                .map_init(
                    || Rasterizer::new(cfg, &assets),
                    |worker, p| match worker {
                        Ok(r) => render_page(r, p),
                        Err(e) => Err(KeepsakeError::environment(format!(
                            "rasterizer setup failed: {e}"
                        ))),
                    },
                )
                .collect()
        })
    } else {
        let mut rasterizer = Rasterizer::new(cfg, &assets)?;
        plans
            .iter()
            .map(|p| render_page(&mut rasterizer, p))
            .collect()
    };

    // Results come back in plan order; sort by index anyway so ordering never depends on the
    // collection strategy.
    let mut pages = rendered.into_iter().collect::<KeepsakeResult<Vec<_>>>()?;
    pages.sort_by_key(|p| p.index);
    let mut pages = pages.into_iter();
    let cover = pages
        .next()
        .ok_or_else(|| KeepsakeError::Other(anyhow::anyhow!("planner produced no cover page")))?;

    assemble(cover, pages.collect(), &request.event_name, &cfg.brand)
}

/// Render a single page (0 = cover) without encoding, for previews.
///
/// Only the photos on that page are resolved.
#[tracing::instrument(skip_all, fields(page = page))]
pub fn render_page_preview(
    request: &JournalRequest,
    cfg: &JournalConfig,
    page: usize,
) -> KeepsakeResult<PageRgba> {
    request.validate()?;
    cfg.validate()?;

    let plans = plan(&request.photos);
    let target = plans.get(page).ok_or_else(|| {
        KeepsakeError::validation(format!(
            "page {page} out of range (journal has {} pages)",
            plans.len()
        ))
    })?;

    let images: ResolvedImages =
        ImageResolver::new(cfg).resolve(target.photos(&request.photos), &CancelToken::new())?;
    let visual = PageCompositor::new(cfg, request).compose(target, &request.photos, &images)?;
    let assets = RenderAssets::load(cfg)?;
    Rasterizer::new(cfg, &assets)?.render_rgba(&visual)
}

fn build_thread_pool(threads: Option<usize>) -> KeepsakeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(KeepsakeError::validation(
            "threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("keepsake-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| KeepsakeError::environment(format!("failed to build rayon thread pool: {e}")))
}
