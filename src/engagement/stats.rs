//! Aggregation/rollup engine
//!
//! Channel and video statistics are derived at read time from raw relation
//! rows, never stored as running counters. Every report is the same shape:
//! filter rows, aggregate (count or sum), project a single number, with an
//! empty result set contributing zero rather than an error. `Rollup` captures
//! that shape once; the individual reports are parameterizations of it.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::store::models::{LikeTargetKind, VideoSummary};

#[derive(Debug, Clone, Copy)]
pub enum Aggregate {
    CountRows,
    Sum(&'static str),
}

/// A single filter → aggregate → project query against one table.
pub struct Rollup {
    table: &'static str,
    aggregate: Aggregate,
    filter: String,
}

impl Rollup {
    pub fn count(table: &'static str, filter: impl Into<String>) -> Self {
        Rollup {
            table,
            aggregate: Aggregate::CountRows,
            filter: filter.into(),
        }
    }

    pub fn sum(table: &'static str, column: &'static str, filter: impl Into<String>) -> Self {
        Rollup {
            table,
            aggregate: Aggregate::Sum(column),
            filter: filter.into(),
        }
    }

    pub fn to_sql(&self) -> String {
        let aggregate = match self.aggregate {
            Aggregate::CountRows => "COUNT(*)".to_string(),
            Aggregate::Sum(column) => format!("SUM({})", column),
        };
        // COALESCE turns the empty-set NULL of SUM into a legitimate zero.
        format!(
            "SELECT COALESCE({}, 0) FROM {} WHERE {}",
            aggregate, self.table, self.filter
        )
    }

    pub fn run<P: rusqlite::Params>(&self, conn: &Connection, params: P) -> Result<u64> {
        let value: i64 = conn
            .query_row(&self.to_sql(), params, |row| row.get(0))
            .with_context(|| format!("Rollup query failed on table {}", self.table))?;
        Ok(value.max(0) as u64)
    }
}

/// Per-channel rollup counters. All zeros is a valid result for a channel with
/// no activity (or one whose owner no longer resolves).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub total_views: u64,
    pub total_likes: u64,
    pub total_videos: u64,
    pub total_subscribers: u64,
    pub total_posts: u64,
}

/// Computes the five channel counters. Each sub-query is independent; a missing
/// or empty branch contributes zero without blocking the others.
pub fn channel_stats(conn: &Connection, channel_id: usize) -> Result<ChannelStats> {
    let video_like_filter = format!(
        "target_kind = {} AND target_id IN (SELECT id FROM video WHERE owner_id = ?1)",
        LikeTargetKind::Video.to_int()
    );

    Ok(ChannelStats {
        total_views: Rollup::sum("video", "views", "owner_id = ?1").run(conn, [channel_id])?,
        total_likes: Rollup::count("content_like", video_like_filter).run(conn, [channel_id])?,
        total_videos: Rollup::count("video", "owner_id = ?1").run(conn, [channel_id])?,
        total_subscribers: Rollup::count("subscription", "channel_id = ?1")
            .run(conn, [channel_id])?,
        total_posts: Rollup::count("tweet", "owner_id = ?1").run(conn, [channel_id])?,
    })
}

/// Live like count for a single video, cheaper than a full channel rollup.
pub fn video_like_count(conn: &Connection, video_id: &str) -> Result<u64> {
    Rollup::count(
        "content_like",
        format!("target_kind = {} AND target_id = ?1", LikeTargetKind::Video.to_int()),
    )
    .run(conn, [video_id])
}

/// Newest-first page of a channel's videos, projected to the summary shape.
/// A page past the end is an empty list, not an error. Unpublished videos
/// are only listed when `include_unpublished` is set; callers pass it for
/// the channel owner and nobody else.
pub fn channel_videos(
    conn: &Connection,
    channel_id: usize,
    include_unpublished: bool,
    page: usize,
    page_size: usize,
) -> Result<Vec<VideoSummary>> {
    let offset = page.saturating_sub(1) * page_size;
    let mut stmt = conn.prepare(
        "SELECT id, title, description, thumbnail_url, views FROM video \
         WHERE owner_id = ?1 AND (published = 1 OR ?2) \
         ORDER BY created DESC, rowid DESC LIMIT ?3 OFFSET ?4",
    )?;
    let videos = stmt
        .query_map(
            rusqlite::params![channel_id, include_unpublished, page_size, offset],
            |row| {
                Ok(VideoSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    thumbnail_url: row.get(3)?,
                    views: row.get::<_, i64>(4)?.max(0) as u64,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(videos)
}
