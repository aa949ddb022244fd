//! Scope selection
//!
//! Copyright (c) 2025 Sifmap Team
//! Licensed under the Apache-2.0 license

use tracing::debug;

use super::scope::ScopeId;
use super::tree::Mappings;
use crate::version::SifVersion;
use crate::{Error, Result};

impl Mappings {
    /// Pick the scope under a top-level scope that best matches a zone,
    /// source and version.
    ///
    /// `node` and its descendants are ranked by how many filter values they
    /// store themselves (fewest first). Each supplied criterion a candidate's
    /// inherited filters reject eliminates it; each one they explicitly match
    /// scores a point. The last candidate in rank order to reach the top score
    /// wins, so among equal scores the most restrictive scope is chosen. When
    /// nothing scores, `node` itself is returned.
    pub fn select(
        &self,
        node: ScopeId,
        zone: Option<&str>,
        source: Option<&str>,
        version: Option<SifVersion>,
    ) -> Result<ScopeId> {
        let scope = self.node(node)?;
        if scope.parent() != Some(self.root()) {
            return Err(Error::selection(format!(
                "select must be called on a direct child of the root, not '{}'",
                scope.display_id()
            )));
        }
        if scope.children().is_empty() {
            return Ok(node);
        }

        let mut candidates = vec![node];
        candidates.extend(self.descendants(node));
        // stable: equal restrictiveness keeps tree order
        candidates.sort_by_key(|c| self.scope(*c).map_or(0, |s| s.restrictiveness()));

        let mut selected = node;
        let mut max = 0;
        for candidate in candidates {
            let Some(score) = self.score(candidate, zone, source, version) else {
                continue;
            };
            if score > 0 && score >= max {
                max = score;
                selected = candidate;
            }
        }

        debug!(
            scope = self.node(selected)?.display_id(),
            score = max,
            zone,
            source,
            version = ?version,
            "selected mappings scope"
        );
        Ok(selected)
    }

    /// Match score of one candidate, `None` if any criterion rejects it
    fn score(
        &self,
        candidate: ScopeId,
        zone: Option<&str>,
        source: Option<&str>,
        version: Option<SifVersion>,
    ) -> Option<i32> {
        let verdicts = [
            zone.map(|z| self.allows_zone(candidate, z)),
            source.map(|s| self.allows_source(candidate, s)),
            version.map(|v| self.allows_version(candidate, v)),
        ];

        let mut score = 0;
        for verdict in verdicts.into_iter().flatten() {
            if verdict < 0 {
                return None;
            }
            score += verdict;
        }
        Some(score)
    }
}
