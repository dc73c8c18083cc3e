use std::collections::HashSet;

use crate::changelog::{self, RenderOptions, StatusCounts};
use crate::config::{Credentials, PlaylistSpec};
use crate::error::SyncError;
use crate::ports::document_store::{DocumentStore, DocumentUpdate, DocumentUpdates};
use crate::ports::playlist_source::PlaylistSource;
use crate::services::gist::GistHttpAdapter;
use crate::services::http::HttpOptions;
use crate::services::youtube::YoutubeHttpAdapter;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub render: RenderOptions,
    /// Compute every document but leave the store untouched.
    pub dry_run: bool,
    /// Delete stored snapshot documents no tracked playlist maps to.
    pub prune: bool,
}

/// What happened to one tracked playlist during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistOutcome {
    Prepared {
        filename: String,
        counts: StatusCounts,
        lines: usize,
        /// The stored snapshot could not be parsed and was treated as empty.
        prior_discarded: bool,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReport {
    pub name: String,
    pub outcome: PlaylistOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub playlists: Vec<PlaylistReport>,
    /// Every change computed for the store, including prunes.
    pub updates: DocumentUpdates,
    /// Whether `updates` were sent to the store.
    pub written: bool,
}

impl SyncReport {
    pub fn skipped(&self) -> impl Iterator<Item = &PlaylistReport> {
        self.playlists
            .iter()
            .filter(|p| matches!(p.outcome, PlaylistOutcome::Skipped { .. }))
    }
}

/// Validates the credentials, wires the HTTP adapters and runs one sync.
pub async fn run_sync(
    credentials: &Credentials,
    playlists: &[PlaylistSpec],
    options: &SyncOptions,
    http: HttpOptions,
) -> Result<SyncReport, SyncError> {
    credentials.validate()?;

    let source = YoutubeHttpAdapter::new(credentials.api_key.clone(), http)
        .map_err(SyncError::SourceSetup)?;
    let store = GistHttpAdapter::new(
        credentials.store_id.clone(),
        credentials.access_token.clone(),
        http,
    )
    .map_err(SyncError::StoreSetup)?;

    PlaylistSyncService::new(source, store)
        .run(playlists, options)
        .await
}

pub struct PlaylistSyncService<P: PlaylistSource, S: DocumentStore> {
    source: P,
    store: S,
}

impl<P: PlaylistSource, S: DocumentStore> PlaylistSyncService<P, S> {
    pub fn new(source: P, store: S) -> Self {
        Self { source, store }
    }

    /// Reconciles every playlist against its stored snapshot, one at a time, and writes
    /// all new snapshots in a single store update.
    ///
    /// # Errors
    /// Only store failures are fatal. A playlist whose items cannot be fetched is skipped
    /// and its document left as it is.
    pub async fn run(
        &self,
        playlists: &[PlaylistSpec],
        options: &SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        let documents = self
            .store
            .fetch_documents()
            .await
            .map_err(SyncError::StoreRead)?;
        log::info!("Loaded {} stored documents", documents.len());

        let mut report = SyncReport::default();

        for playlist in playlists {
            log::info!("Processing playlist: {:?}", playlist.name);
            let filename = changelog::snapshot_filename(&playlist.name);

            let titles = match self.source.playlist_titles(&playlist.id).await {
                Ok(titles) => titles,
                Err(e) => {
                    log::error!("Error fetching playlist {}: {}", playlist.name, e);
                    report.playlists.push(PlaylistReport {
                        name: playlist.name.clone(),
                        outcome: PlaylistOutcome::Skipped {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };
            log::info!("Fetched {} items for {}", titles.len(), playlist.name);

            let prior_text = documents.get(&filename).map(String::as_str).unwrap_or("");
            let (prior, prior_discarded) = match changelog::parse(prior_text) {
                Ok(prior) => (prior, false),
                Err(e) => {
                    log::warn!(
                        "Stored snapshot {} is unreadable, starting over: {}",
                        filename,
                        e
                    );
                    (Vec::new(), true)
                }
            };

            let result = changelog::reconcile(&prior, &titles);
            let content = changelog::render(&playlist.name, &result, &options.render);
            let counts = result.counts();
            if !result.has_changes() {
                log::debug!("No membership changes for {}", playlist.name);
            }
            let lines = content.lines().count();

            log::info!(
                "Prepared {} lines for {} ({} kept, {} added, {} removed)",
                lines,
                filename,
                counts.kept,
                counts.added,
                counts.removed
            );

            report.playlists.push(PlaylistReport {
                name: playlist.name.clone(),
                outcome: PlaylistOutcome::Prepared {
                    filename: filename.clone(),
                    counts,
                    lines,
                    prior_discarded,
                },
            });
            report
                .updates
                .insert(filename, DocumentUpdate::Write(content));
        }

        if options.prune {
            let tracked: HashSet<String> = playlists
                .iter()
                .map(|p| changelog::snapshot_filename(&p.name))
                .collect();
            for filename in documents.keys() {
                if changelog::is_snapshot_filename(filename) && !tracked.contains(filename) {
                    log::info!("Pruning untracked snapshot {}", filename);
                    report
                        .updates
                        .insert(filename.clone(), DocumentUpdate::Delete);
                }
            }
        }

        if report.updates.is_empty() {
            log::info!("Nothing to update");
            return Ok(report);
        }

        if options.dry_run {
            log::info!("Dry run, skipping update of {} files", report.updates.len());
            return Ok(report);
        }

        self.store
            .apply_updates(report.updates.clone())
            .await
            .map_err(SyncError::StoreWrite)?;
        report.written = true;
        log::info!("Store updated with {} files", report.updates.len());

        Ok(report)
    }
}
