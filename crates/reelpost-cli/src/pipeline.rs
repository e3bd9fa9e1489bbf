//! Single-query republishing run: locate, stage, publish, clean up.
//!
//! Stages run strictly in sequence and each one gates the next. Once a video
//! has been staged, the staged object is deleted on every exit path of the
//! publish chain.

use anyhow::Context;
use reelpost_core::{AppConfig, PollPolicy, StagedAsset, VideoCandidate};
use reelpost_publish::{GraphClient, PublishReceipt};
use reelpost_search::SearchClient;
use reelpost_storage::StorageClient;

#[derive(Debug)]
pub(crate) enum RunOutcome {
    /// The search produced no usable video; nothing else ran.
    NoCandidate,
    /// The Graph API returned no container id.
    NoContainer,
    Published {
        container_id: String,
        receipt: PublishReceipt,
    },
}

pub(crate) struct Pipeline {
    search: SearchClient,
    storage: StorageClient,
    graph: GraphClient,
    poll: PollPolicy,
}

impl Pipeline {
    pub(crate) fn new(
        search: SearchClient,
        storage: StorageClient,
        graph: GraphClient,
        poll: PollPolicy,
    ) -> Self {
        Self {
            search,
            storage,
            graph,
            poll,
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            SearchClient::from_config(config).context("building search client")?,
            StorageClient::from_config(config).context("building storage client")?,
            GraphClient::from_config(config).context("building Graph API client")?,
            config.poll_policy(),
        ))
    }

    pub(crate) async fn locate(&self, query: &str) -> Option<VideoCandidate> {
        self.search.locate(query).await
    }

    pub(crate) async fn run(&self, query: &str, file_name: &str) -> anyhow::Result<RunOutcome> {
        let Some(candidate) = self.search.locate(query).await else {
            return Ok(RunOutcome::NoCandidate);
        };

        let asset = self
            .storage
            .upload(&candidate.url, file_name)
            .await
            .context("staging video")?;

        let result = self.publish_staged(&asset, &candidate.caption()).await;

        match result {
            Ok(outcome) => {
                self.storage
                    .delete(&asset.file_name)
                    .await
                    .context("deleting staged video")?;
                Ok(outcome)
            }
            Err(err) => {
                if let Err(cleanup) = self.storage.delete(&asset.file_name).await {
                    tracing::warn!(
                        file_name = asset.file_name.as_str(),
                        error = %cleanup,
                        "failed to delete staged video after publish failure"
                    );
                }
                Err(err)
            }
        }
    }

    async fn publish_staged(
        &self,
        asset: &StagedAsset,
        caption: &str,
    ) -> anyhow::Result<RunOutcome> {
        let Some(container_id) = self
            .graph
            .create_container(&asset.public_url, caption)
            .await
            .context("creating media container")?
        else {
            return Ok(RunOutcome::NoContainer);
        };

        self.graph
            .wait_until_finished(&container_id, &self.poll)
            .await
            .context("waiting for media container")?;

        let receipt = self
            .graph
            .publish(&container_id)
            .await
            .context("publishing media container")?;

        Ok(RunOutcome::Published {
            container_id,
            receipt,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
