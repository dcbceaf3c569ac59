//! Deterministic vector avatars.
//!
//! The avatar lab renders a small SVG locally from a prompt and the agent's
//! name. A string hash picks the palette, gradient angle and accent shape,
//! so the same inputs always give the same image. No image service is
//! involved.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use tracing::debug;

use agora_types::SocialState;

/// Background colour pairs for the gradient.
const PALETTE: &[(&str, &str)] = &[
    ("#f97316", "#facc15"),
    ("#0ea5e9", "#6366f1"),
    ("#10b981", "#84cc16"),
    ("#ec4899", "#8b5cf6"),
    ("#14b8a6", "#0284c7"),
    ("#f43f5e", "#fb923c"),
    ("#a855f7", "#22d3ee"),
    ("#64748b", "#0f172a"),
];

/// 32-bit FNV-1a.
pub fn string_hash(input: &str) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    input.bytes().fold(OFFSET, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(PRIME)
    })
}

/// Up to two uppercase initials from a display name.
fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().find(char::is_ascii_alphanumeric))
        .take(2)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        String::from("?")
    } else {
        letters
    }
}

/// Render the avatar SVG markup for `prompt` and `agent_name`.
pub fn render_avatar_svg(prompt: &str, agent_name: &str) -> String {
    let hash = string_hash(&format!("{prompt}|{agent_name}"));
    let palette_len = u32::try_from(PALETTE.len()).unwrap_or(1);
    let idx = usize::try_from(hash.checked_rem(palette_len).unwrap_or(0)).unwrap_or(0);
    let (from, to) = PALETTE.get(idx).copied().unwrap_or(("#64748b", "#0f172a"));
    let angle = (hash >> 8) % 360;
    let ring = 28_u32.saturating_add((hash >> 16) % 12);
    let accent_x = 20_u32.saturating_add((hash >> 20) % 60);

    format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"96\" height=\"96\" viewBox=\"0 0 96 96\">",
            "<defs><linearGradient id=\"g\" gradientTransform=\"rotate({angle} .5 .5)\">",
            "<stop offset=\"0\" stop-color=\"{from}\"/><stop offset=\"1\" stop-color=\"{to}\"/>",
            "</linearGradient></defs>",
            "<rect width=\"96\" height=\"96\" rx=\"20\" fill=\"url(#g)\"/>",
            "<circle cx=\"48\" cy=\"48\" r=\"{ring}\" fill=\"#ffffff\" fill-opacity=\"0.18\"/>",
            "<circle cx=\"{accent_x}\" cy=\"18\" r=\"6\" fill=\"#ffffff\" fill-opacity=\"0.35\"/>",
            "<text x=\"48\" y=\"58\" font-family=\"sans-serif\" font-size=\"28\" ",
            "font-weight=\"700\" text-anchor=\"middle\" fill=\"#ffffff\">{initials}</text>",
            "</svg>"
        ),
        angle = angle,
        from = from,
        to = to,
        ring = ring,
        accent_x = accent_x,
        initials = initials(agent_name),
    )
}

/// Render the avatar as a self-contained `data:` URI.
pub fn generate_avatar(prompt: &str, agent_name: &str) -> String {
    let svg = render_avatar_svg(prompt, agent_name);
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

/// Generate an avatar for the lab's target agent and store it on its profile.
///
/// No-op when no target is set or the target has no profile.
pub fn apply_generated_avatar(state: &SocialState, now: DateTime<Utc>) -> SocialState {
    let Some(target) = state.lab.target_agent_id.clone() else {
        debug!("Avatar generation skipped: no target agent");
        return state.clone();
    };
    let mut next = state.clone();
    let Some(profile) = next.profiles.get_mut(&target) else {
        debug!(agent = %target, "Avatar generation skipped: unknown target");
        return state.clone();
    };
    let name = profile.handle.trim_start_matches('@').replace('_', " ");
    profile.avatar_image = Some(generate_avatar(&state.lab.avatar_prompt, &name));
    next.lab.last_generated_at = Some(now);
    next
}
