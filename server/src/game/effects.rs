//! Typed shop item effects.

use serde::{Deserialize, Serialize};

use crate::game::types::{BoosterKind, Resource, RoleTier, ShopCategory};

/// XP bonus granted when a gradient is bought.
pub const GRADIENT_XP_BONUS: i64 = 300;
/// XP bonus granted when a theme is bought.
pub const THEME_XP_BONUS: i64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    Title {
        title_text: String,
        #[serde(default = "default_title_color")]
        title_color: String,
    },
    CustomRole {
        #[serde(default)]
        role_tier: RoleTier,
    },
    EmojiSlot {
        #[serde(default = "one")]
        emoji_slots: i64,
    },
    Booster {
        booster_type: BoosterKind,
        multiplier: f64,
        duration_minutes: i64,
    },
    Gradient {
        colors: Vec<String>,
        #[serde(default = "default_direction")]
        direction: String,
        #[serde(default)]
        is_animated: bool,
    },
    Theme {
        primary_color: String,
    },
    Cursor,
    Avatar,
    Consumable {
        resource: Resource,
        amount: i64,
    },
}

fn default_title_color() -> String {
    "#ffffff".into()
}

fn default_direction() -> String {
    "45deg".into()
}

fn one() -> i64 {
    1
}

fn is_hex_color(s: &str) -> bool {
    let hex = match s.strip_prefix('#') {
        Some(h) => h,
        None => return false,
    };
    matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

impl ItemEffect {
    pub fn category(&self) -> ShopCategory {
        match self {
            ItemEffect::Title { .. } => ShopCategory::Title,
            ItemEffect::CustomRole { .. } => ShopCategory::CustomRole,
            ItemEffect::EmojiSlot { .. } => ShopCategory::EmojiSlot,
            ItemEffect::Booster { .. } => ShopCategory::Booster,
            ItemEffect::Gradient { .. } => ShopCategory::Gradient,
            ItemEffect::Theme { .. } => ShopCategory::Theme,
            ItemEffect::Cursor => ShopCategory::Cursor,
            ItemEffect::Avatar => ShopCategory::Avatar,
            ItemEffect::Consumable { .. } => ShopCategory::Consumable,
        }
    }

    /// Reject effects that could not be applied at purchase time.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ItemEffect::Title {
                title_text,
                title_color,
            } => {
                if title_text.trim().is_empty() {
                    return Err("title_text must not be empty".into());
                }
                if !is_hex_color(title_color) {
                    return Err(format!("invalid title_color {title_color:?}"));
                }
            }
            ItemEffect::EmojiSlot { emoji_slots } if *emoji_slots <= 0 => {
                return Err("emoji_slots must be positive".into());
            }
            ItemEffect::Booster {
                multiplier,
                duration_minutes,
                ..
            } => {
                if !multiplier.is_finite() || *multiplier <= 1.0 {
                    return Err("booster multiplier must be greater than 1".into());
                }
                if *duration_minutes <= 0 {
                    return Err("booster duration must be positive".into());
                }
            }
            ItemEffect::Gradient { colors, .. } => {
                if !(2..=3).contains(&colors.len()) {
                    return Err("gradient needs 2 or 3 colors".into());
                }
                if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
                    return Err(format!("invalid gradient color {bad:?}"));
                }
            }
            ItemEffect::Theme { primary_color } if !is_hex_color(primary_color) => {
                return Err(format!("invalid primary_color {primary_color:?}"));
            }
            ItemEffect::Consumable { amount, .. } if *amount <= 0 => {
                return Err("consumable amount must be positive".into());
            }
            _ => {}
        }
        Ok(())
    }
}

/// Product of every active booster that applies to `target`.
pub fn combined_multiplier<I>(active: I, target: BoosterKind) -> f64
where
    I: IntoIterator<Item = (BoosterKind, f64)>,
{
    active
        .into_iter()
        .filter(|(kind, _)| kind.affects(target))
        .map(|(_, m)| m)
        .product()
}

/// Apply a multiplier to a reward, truncating toward zero.
pub fn boosted(amount: i64, multiplier: f64) -> i64 {
    (amount as f64 * multiplier) as i64
}

/// Lower-case slug used as the unique key for titles.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('_');
            dash = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_parse_from_tagged_json() {
        let e: ItemEffect = serde_json::from_str(
            r#"{"kind":"booster","booster_type":"coins","multiplier":2.0,"duration_minutes":60}"#,
        )
        .unwrap();
        assert_eq!(e.category(), ShopCategory::Booster);
        assert!(e.validate().is_ok());

        let role: ItemEffect = serde_json::from_str(r#"{"kind":"custom_role"}"#).unwrap();
        assert_eq!(
            role,
            ItemEffect::CustomRole {
                role_tier: RoleTier::Basic
            }
        );
    }

    #[test]
    fn gradient_needs_two_or_three_hex_colors() {
        let g = |colors: &[&str]| ItemEffect::Gradient {
            colors: colors.iter().map(|c| c.to_string()).collect(),
            direction: "45deg".into(),
            is_animated: false,
        };
        assert!(g(&["#ff0000"]).validate().is_err());
        assert!(g(&["#ff0000", "#00ff00"]).validate().is_ok());
        assert!(g(&["#ff0000", "#00ff00", "#0000ff", "#fff"]).validate().is_err());
        assert!(g(&["#ff0000", "green"]).validate().is_err());
    }

    #[test]
    fn weak_boosters_are_rejected() {
        let b = ItemEffect::Booster {
            booster_type: BoosterKind::Mega,
            multiplier: 1.0,
            duration_minutes: 30,
        };
        assert!(b.validate().is_err());
    }

    #[test]
    fn boosters_multiply_with_mega() {
        let active = [
            (BoosterKind::Coins, 2.0),
            (BoosterKind::Mega, 1.5),
            (BoosterKind::Reputation, 3.0),
        ];
        assert_eq!(combined_multiplier(active, BoosterKind::Coins), 3.0);
        assert_eq!(combined_multiplier(active, BoosterKind::Reputation), 4.5);
        assert_eq!(combined_multiplier([], BoosterKind::Coins), 1.0);
        assert_eq!(boosted(100, 1.5), 150);
    }

    #[test]
    fn slugs_are_lowercase_and_underscored() {
        assert_eq!(slugify("  Bed Destroyer!! "), "bed_destroyer");
        assert_eq!(slugify("Top-1 Fragger"), "top_1_fragger");
    }
}
