//! Achievement rewards derived from dashboard statistics.
//!
//! # Invariants
//! - Rewards are a pure function of one [`Dashboard`] snapshot; nothing is
//!   persisted.
//! - The catalog order is stable and is the order of the summary.

use crate::model::dashboard::Dashboard;
use serde::Serialize;

/// One achievement definition.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Points granted once unlocked.
    pub reward: u32,
    unlocked_when: fn(&Dashboard) -> bool,
}

impl Achievement {
    pub fn is_unlocked(&self, dashboard: &Dashboard) -> bool {
        (self.unlocked_when)(dashboard)
    }
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "getting_started",
        title: "Getting Started",
        description: "Create your first todo",
        reward: 10,
        unlocked_when: has_any_todo,
    },
    Achievement {
        id: "completion_master",
        title: "Completion Master",
        description: "Complete 10 todos",
        reward: 50,
        unlocked_when: completed_ten,
    },
    Achievement {
        id: "productivity_guru",
        title: "Productivity Guru",
        description: "Complete 50 todos",
        reward: 100,
        unlocked_when: completed_fifty,
    },
    Achievement {
        id: "streak_keeper",
        title: "Streak Keeper",
        description: "Have 5 todos due this week",
        reward: 25,
        unlocked_when: busy_week,
    },
    Achievement {
        id: "speed_demon",
        title: "Speed Demon",
        description: "Have 20 todos due this month",
        reward: 75,
        unlocked_when: busy_month,
    },
    Achievement {
        id: "perfectionist",
        title: "Perfectionist",
        description: "Achieve a 100% completion rate",
        reward: 200,
        unlocked_when: everything_done,
    },
];

fn has_any_todo(dashboard: &Dashboard) -> bool {
    dashboard.total >= 1
}

fn completed_ten(dashboard: &Dashboard) -> bool {
    dashboard.completed >= 10
}

fn completed_fifty(dashboard: &Dashboard) -> bool {
    dashboard.completed >= 50
}

fn busy_week(dashboard: &Dashboard) -> bool {
    dashboard.this_week >= 5
}

fn busy_month(dashboard: &Dashboard) -> bool {
    dashboard.this_month >= 20
}

fn everything_done(dashboard: &Dashboard) -> bool {
    dashboard.total > 0 && dashboard.completed == dashboard.total
}

/// Achievement state within a [`RewardsSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementProgress {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub reward: u32,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSummary {
    pub completion_rate: u32,
    /// Sum of rewards of unlocked achievements.
    pub total_points: u32,
    pub unlocked_count: usize,
    pub achievements: Vec<AchievementProgress>,
}

/// Evaluates the full catalog against one dashboard snapshot.
pub fn evaluate_rewards(dashboard: &Dashboard) -> RewardsSummary {
    let achievements = ACHIEVEMENTS
        .iter()
        .map(|achievement| AchievementProgress {
            id: achievement.id,
            title: achievement.title,
            description: achievement.description,
            reward: achievement.reward,
            unlocked: achievement.is_unlocked(dashboard),
        })
        .collect::<Vec<_>>();

    let unlocked = achievements.iter().filter(|item| item.unlocked);
    let total_points = unlocked.clone().map(|item| item.reward).sum();
    let unlocked_count = unlocked.count();

    RewardsSummary {
        completion_rate: dashboard.completion_rate,
        total_points,
        unlocked_count,
        achievements,
    }
}
