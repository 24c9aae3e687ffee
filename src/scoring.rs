//! Scoring rules: stars for a level, placement after onboarding, and how a
//! finished level updates learner progress.

use tracing::info;

use crate::badges;
use crate::domain::{LevelRecord, Progress};

/// Stars for a level result: 3 at 80 %, 2 at 60 %, 1 at 40 %.
pub fn stars_for(score: u32, max_score: u32) -> u8 {
  if max_score == 0 {
    return 0;
  }
  let pct = u64::from(score) * 100;
  let max = u64::from(max_score);
  if pct >= 80 * max {
    3
  } else if pct >= 60 * max {
    2
  } else if pct >= 40 * max {
    1
  } else {
    0
  }
}

/// Starting level from the placement test, between 1 and 6.
pub fn placement_level(correct: usize, total: usize) -> u32 {
  if total == 0 {
    return 1;
  }
  let pct = correct * 100;
  if pct >= 90 * total {
    6
  } else if pct >= 80 * total {
    5
  } else if pct >= 70 * total {
    4
  } else if pct >= 60 * total {
    3
  } else if pct >= 50 * total {
    2
  } else {
    1
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelUpdate {
  pub progress: Progress,
  pub stars: u8,
  /// Badge ids first earned with this result, point badges first.
  pub new_badges: Vec<String>,
}

/// Fold a finished level into `progress`.
///
/// The level's record is replaced by this attempt, the next level is unlocked
/// (up to `max_level`) and becomes the current one, and the badge list is
/// rebuilt from points plus level badges.
pub fn apply_level_result(progress: &Progress, level: u32, score: u32, max_score: u32, max_level: u32) -> LevelUpdate {
  let stars = stars_for(score, max_score);
  let total_points = progress.total_points.saturating_add(score);

  let mut completed_levels = progress.completed_levels.clone();
  completed_levels.insert(level, LevelRecord { stars, score });

  let highest = progress.highest_unlocked_level.max(level.saturating_add(1).min(max_level));

  let mut new_badges: Vec<String> = badges::new_point_badges(total_points, &progress.badges)
    .into_iter()
    .map(String::from)
    .collect();
  let level_badge = badges::level_badge(level, stars, &progress.badges);
  if let Some(id) = level_badge {
    new_badges.push(id.to_string());
  }

  let mut all: Vec<String> = badges::earned_point_badges(total_points).into_iter().map(String::from).collect();
  all.extend(progress.badges.iter().filter(|id| badges::is_level_badge(id)).cloned());
  all.extend(level_badge.map(String::from));
  let mut seen = std::collections::HashSet::new();
  all.retain(|id| seen.insert(id.clone()));

  info!(target: "progress", level, score, max_score, stars, total_points, unlocked = highest, new_badges = new_badges.len(), "level result applied");

  LevelUpdate {
    progress: Progress {
      current_level: highest,
      highest_unlocked_level: highest,
      total_points,
      completed_levels,
      badges: all,
      onboarding_complete: progress.onboarding_complete,
    },
    stars,
    new_badges,
  }
}

/// Record the placement test's starting level and mark onboarding done.
pub fn apply_placement(progress: &Progress, level: u32) -> Progress {
  info!(target: "progress", level, "placement applied");
  Progress {
    current_level: level,
    highest_unlocked_level: level,
    onboarding_complete: true,
    ..progress.clone()
  }
}
