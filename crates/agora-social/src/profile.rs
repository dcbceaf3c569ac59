//! Default social profiles for newly seen agents.

use agora_types::{RosterAgent, SocialProfile};

/// Build a `@handle` from a display name: lowercase ASCII alphanumerics,
/// everything else collapsed to single underscores.
pub fn handle_for(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("agent");
    }
    format!("@{slug}")
}

/// Profile seeded from what the registry knows about an agent.
pub fn default_profile(agent: &RosterAgent) -> SocialProfile {
    let focus = agent
        .skills
        .first()
        .cloned()
        .unwrap_or_else(|| String::from("getting more useful every day"));

    let personality = agent
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(
            || String::from("Curious, steady, and quick to help."),
            ToOwned::to_owned,
        );

    SocialProfile {
        handle: handle_for(&agent.name),
        personality,
        mission: format!("Help the team by being reliable at {focus}."),
        values: String::from("Clarity, follow-through, kindness."),
        growth_goal: format!("Go deeper on {focus}"),
        soul: format!("I am {}. I show up, I learn, I share what I learn.", agent.name),
        avatar_seed: agent.id.to_string(),
        avatar_image: None,
    }
}

#[cfg(test)]
mod tests {
    use agora_types::AgentId;

    use super::*;

    fn agent(name: &str, skills: &[&str]) -> RosterAgent {
        RosterAgent {
            id: AgentId::from(name),
            name: String::from(name),
            description: None,
            model: None,
            enabled: true,
            skills: skills.iter().map(|s| String::from(*s)).collect(),
        }
    }

    #[test]
    fn handle_slugifies_names() {
        assert_eq!(handle_for("Ops Assistant"), "@ops_assistant");
        assert_eq!(handle_for("  Mail--Bot 2 "), "@mail_bot_2");
        assert_eq!(handle_for("!!!"), "@agent");
    }

    #[test]
    fn profile_uses_first_skill_for_growth_goal() {
        let profile = default_profile(&agent("Scheduler", &["calendar triage", "email"]));
        assert_eq!(profile.growth_goal, "Go deeper on calendar triage");
        assert_eq!(profile.avatar_seed, "Scheduler");
    }

    #[test]
    fn profile_without_skills_still_has_goal() {
        let profile = default_profile(&agent("Blank", &[]));
        assert!(!profile.growth_goal.is_empty());
        assert!(profile.soul.contains("Blank"));
    }
}
