use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{MutexGuard, oneshot};

use crate::assets::decode::{BackgroundImage, decode_background};
use crate::config::EngineConfig;
use crate::effects::style::EffectStyle;
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{LogoError, LogoResult, Rejection};
use crate::render::export::{ExportedImage, export};
use crate::render::pipeline::{RenderResult, RenderSettings, render_cancellable};
use crate::session::params::{Command, ParamLimits, ParameterVector, TextRules};
use crate::session::state::{Session, SessionKey, SessionSnapshot};
use crate::session::store::{SessionHandle, SessionStore};
use crate::text::registry::{FontId, FontRegistry};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Acknowledgement of a stored background.
pub struct SessionCreated {
    /// Session key.
    pub key: SessionKey,
    /// Background width in pixels.
    pub width: u32,
    /// Background height in pixels.
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq)]
/// One uncommitted preview from [`Engine::preview_styles`].
pub struct StyleVariant {
    /// Effect this frame was rendered with.
    pub effect: EffectStyle,
    /// The frame.
    pub frame: RenderResult,
}

/// Async front door of the composition engine.
///
/// Each command locks its session for the whole command, render included, so commands for one
/// key are applied in arrival order. Pixel work runs on a dedicated rayon pool and is awaited
/// through a oneshot channel; the async caller never blocks on it. A render that misses its
/// deadline is cancelled and the session stays locked until the worker has stopped.
pub struct Engine {
    config: EngineConfig,
    fonts: Arc<FontRegistry>,
    settings: RenderSettings,
    limits: ParamLimits,
    rules: TextRules,
    pool: Arc<rayon::ThreadPool>,
    sessions: SessionStore,
}

impl Engine {
    /// Build an engine: validate `config`, register the built-in face plus `fonts_dir`, and start
    /// the render pool.
    pub fn new(config: EngineConfig) -> LogoResult<Self> {
        let mut fonts = FontRegistry::with_builtin();
        if let Some(dir) = &config.fonts_dir {
            let loaded = fonts.load_dir(dir)?;
            tracing::info!(dir = %dir.display(), count = loaded.len(), "loaded fonts");
        }
        Self::with_fonts(config, fonts)
    }

    /// Build an engine around an already populated registry.
    pub fn with_fonts(config: EngineConfig, fonts: FontRegistry) -> LogoResult<Self> {
        config.validate()?;
        if !fonts.contains(&config.default_font) {
            return Err(LogoError::validation(format!(
                "default_font '{}' is not registered",
                config.default_font
            )));
        }
        let pool = build_thread_pool(config.render_threads)?;
        Ok(Self {
            settings: config.render_settings(),
            limits: config.param_limits(),
            rules: config.text_rules(),
            fonts: Arc::new(fonts),
            pool: Arc::new(pool),
            sessions: SessionStore::new(),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered font ids, sorted.
    pub fn font_ids(&self) -> Vec<FontId> {
        self.fonts.ids().cloned().collect()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.len().await
    }

    /// Store the background for `key`, creating the session.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %key, bytes = bytes.len()))]
    pub async fn submit_image(&self, key: &SessionKey, bytes: &[u8]) -> LogoResult<SessionCreated> {
        if let Some(handle) = self.sessions.get(key).await {
            self.lock(&handle).await?.check_image().inspect_err(log_rejection)?;
        }

        let limits = self.config.decode_limits();
        let payload = bytes.to_vec();
        let background = self
            .run_on_pool(move || decode_background(&payload, limits))
            .await
            .inspect_err(log_rejection)?;
        let (width, height) = (background.width(), background.height());

        let handle = self
            .sessions
            .get_or_create(key, || Session::new(key.clone(), self.defaults(key)))
            .await;
        let mut session = self.lock(&handle).await?;
        session
            .accept_image(Arc::new(background), self.defaults(key))
            .inspect_err(log_rejection)?;

        tracing::info!(%key, width, height, "session started");
        Ok(SessionCreated {
            key: key.clone(),
            width,
            height,
        })
    }

    /// Place the text and produce the first render.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %key))]
    pub async fn submit_text(&self, key: &SessionKey, text: &str) -> LogoResult<RenderResult> {
        let handle = self.existing(key).await?;
        let mut session = self.lock(&handle).await?;
        let candidate = session
            .prepare_text(text, &self.rules)
            .inspect_err(log_rejection)?;
        let result = self.render_candidate(&session, candidate.clone()).await?;
        session.commit(candidate);
        Ok(result)
    }

    /// Apply one adjustment and re-render.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %key, op = cmd.kind()))]
    pub async fn submit_adjustment(
        &self,
        key: &SessionKey,
        cmd: Command,
    ) -> LogoResult<RenderResult> {
        let handle = self.existing(key).await?;
        let mut session = self.lock(&handle).await?;
        let candidate = session
            .prepare_adjustment(&cmd, &self.limits, &self.fonts)
            .inspect_err(log_rejection)?;
        let result = self.render_candidate(&session, candidate.clone()).await?;
        session.commit(candidate);
        Ok(result)
    }

    /// Render the committed vector once per [`EffectStyle`] without changing the session.
    ///
    /// All frames are produced by one pool job under one deadline; pick one with
    /// [`Command::SetEffect`].
    #[tracing::instrument(level = "debug", skip_all, fields(key = %key))]
    pub async fn preview_styles(&self, key: &SessionKey) -> LogoResult<Vec<StyleVariant>> {
        let handle = self.existing(key).await?;
        let session = self.lock(&handle).await?;
        let candidates = session
            .prepare_variants(&EffectStyle::ALL)
            .inspect_err(log_rejection)?;

        let background = stored_background(&session)?;
        let fonts = self.fonts.clone();
        let settings = self.settings;
        let variants = self
            .run_render(move |cancel| {
                candidates
                    .iter()
                    .map(|params| {
                        let frame =
                            render_cancellable(&background, params, &fonts, &settings, cancel)?;
                        Ok(StyleVariant {
                            effect: params.effect,
                            frame,
                        })
                    })
                    .collect::<LogoResult<Vec<_>>>()
            })
            .await?;
        tracing::debug!(%key, count = variants.len(), "style variants rendered");
        Ok(variants)
    }

    /// Render, flatten and encode the final image, then close the session.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %key))]
    pub async fn finalize(&self, key: &SessionKey) -> LogoResult<ExportedImage> {
        let handle = self.existing(key).await?;
        let mut session = self.lock(&handle).await?;
        session.prepare_finalize().inspect_err(log_rejection)?;

        let background = stored_background(&session)?;
        let params = session.params().clone();
        let fonts = self.fonts.clone();
        let settings = self.settings;
        let opts = self.config.export;
        let exported = self
            .run_render(move |cancel| {
                let frame = render_cancellable(&background, &params, &fonts, &settings, cancel)?;
                cancel.check()?;
                export(&frame.image, &opts)
            })
            .await?;

        session.close();
        tracing::info!(
            %key,
            format = ?exported.format,
            bytes = exported.bytes.len(),
            "session finalized"
        );
        Ok(exported)
    }

    /// Drop the session for `key`. Returns whether one existed.
    pub async fn end_session(&self, key: &SessionKey) -> bool {
        self.sessions.remove(key).await
    }

    /// Serializable view of the session for `key`.
    pub async fn snapshot(&self, key: &SessionKey) -> LogoResult<SessionSnapshot> {
        let handle = self.existing(key).await?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    fn defaults(&self, key: &SessionKey) -> ParameterVector {
        ParameterVector::initial(
            self.config.default_font.clone(),
            self.config.default_color,
            key.seed(),
        )
    }

    async fn existing(&self, key: &SessionKey) -> LogoResult<SessionHandle> {
        self.sessions
            .get(key)
            .await
            .ok_or_else(|| LogoError::from(Rejection::NoSession))
            .inspect_err(log_rejection)
    }

    async fn lock<'a>(&self, handle: &'a SessionHandle) -> LogoResult<MutexGuard<'a, Session>> {
        if self.config.reject_when_busy {
            return handle.try_lock().map_err(|_| {
                tracing::warn!("session busy");
                LogoError::from(Rejection::Busy)
            });
        }
        Ok(handle.lock().await)
    }

    async fn render_candidate(
        &self,
        session: &Session,
        params: ParameterVector,
    ) -> LogoResult<RenderResult> {
        let background = stored_background(session)?;
        let fonts = self.fonts.clone();
        let settings = self.settings;
        self.run_render(move |cancel| {
            render_cancellable(&background, &params, &fonts, &settings, cancel)
        })
        .await
    }

    /// Run pixel work on the pool under the render deadline.
    ///
    /// On timeout the job's token is cancelled and this still waits for the worker to return, so
    /// the caller's session guard outlives the abandoned render and the pool slot is free again
    /// by the time the error is reported.
    async fn run_render<T, F>(&self, job: F) -> LogoResult<T>
    where
        F: FnOnce(&CancelToken) -> LogoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let cancel = CancelToken::new();
        let _stop_if_abandoned = cancel.cancel_on_drop();
        let worker = cancel.clone();
        let mut rx = self.spawn_on_pool(move || {
            worker.check()?;
            job(&worker)
        });

        let ms = self.config.render_timeout_ms;
        match tokio::time::timeout(Duration::from_millis(ms), &mut rx).await {
            Ok(res) => {
                joined(res).inspect_err(|e| tracing::warn!(error = %e, "render failed"))
            }
            Err(_) => {
                cancel.cancel();
                let started = tokio::time::Instant::now();
                let _ = rx.await;
                tracing::warn!(
                    timeout_ms = ms,
                    unwind_ms = started.elapsed().as_millis() as u64,
                    "render timed out"
                );
                Err(LogoError::render(format!("render exceeded {ms} ms")))
            }
        }
    }

    async fn run_on_pool<T, F>(&self, job: F) -> LogoResult<T>
    where
        F: FnOnce() -> LogoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        joined(self.spawn_on_pool(job).await)
    }

    fn spawn_on_pool<T, F>(&self, job: F) -> oneshot::Receiver<LogoResult<T>>
    where
        F: FnOnce() -> LogoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let res = std::panic::catch_unwind(AssertUnwindSafe(job))
                .unwrap_or_else(|_| Err(LogoError::render("pool worker panicked")));
            let _ = tx.send(res);
        });
        rx
    }
}

fn joined<T>(res: Result<LogoResult<T>, oneshot::error::RecvError>) -> LogoResult<T> {
    res.map_err(|_| LogoError::render("pool worker dropped the job"))?
}

fn stored_background(session: &Session) -> LogoResult<Arc<BackgroundImage>> {
    session
        .background()
        .cloned()
        .ok_or_else(|| LogoError::from(Rejection::NoSession))
}

fn log_rejection(err: &LogoError) {
    match err.rejection() {
        Some(reason) => tracing::warn!(%reason, "command rejected"),
        None => tracing::warn!(error = %err, "command failed"),
    }
}

fn build_thread_pool(threads: Option<usize>) -> LogoResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LogoError::validation("render_threads must be >= 1 when set"));
    }
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("logoforge-render-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LogoError::render(format!("failed to build render thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
