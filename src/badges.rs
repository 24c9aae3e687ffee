//! Badge catalog: five point badges unlocked by total points and one badge per
//! level unlocked by finishing that level with two or more stars.

use serde::Serialize;

use crate::domain::Language;
use crate::i18n::{text, Localized};

/// Stars a level result needs before its badge is awarded.
pub const LEVEL_BADGE_MIN_STARS: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeIcon {
  Star,
  Trophy,
  Award,
  Zap,
  Target,
}

/// How the frontend should draw a badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeArt {
  Icon { icon: BadgeIcon },
  /// Custom artwork; `fallback` is drawn until the image is available.
  Image { path: &'static str, fallback: BadgeIcon },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unlock {
  Points(u32),
  Level(u32),
}

#[derive(Clone, Copy, Debug)]
pub struct BadgeDef {
  pub id: &'static str,
  pub unlock: Unlock,
  pub art: BadgeArt,
  pub name: Localized,
}

macro_rules! point_badge {
  ($id:expr, $threshold:expr, $icon:ident, $ca:expr, $en:expr, $de:expr, $es:expr) => {
    BadgeDef {
      id: $id,
      unlock: Unlock::Points($threshold),
      art: BadgeArt::Icon { icon: BadgeIcon::$icon },
      name: text!($ca, $en, $de, $es),
    }
  };
}

macro_rules! level_badge {
  ($level:literal, $ca:expr, $en:expr, $de:expr, $es:expr) => {
    BadgeDef {
      id: concat!("level_", $level, "_badge"),
      unlock: Unlock::Level($level),
      art: BadgeArt::Image { path: concat!("/badges/level-", $level, ".png"), fallback: BadgeIcon::Award },
      name: text!($ca, $en, $de, $es),
    }
  };
}

pub static POINT_BADGES: [BadgeDef; 5] = [
  point_badge!("first_steps", 0, Star, "Primers Passos", "First Steps", "Erste Schritte", "Primeros Pasos"),
  point_badge!("fraction_master", 200, Trophy, "Mestre de Fraccions", "Fraction Master", "Bruchmeister", "Maestro de Fracciones"),
  point_badge!("perfect_score", 400, Award, "Puntuació Perfecta", "Perfect Score", "Perfekte Punktzahl", "Puntuación Perfecta"),
  point_badge!("speed_demon", 600, Zap, "Dimoni de la Velocitat", "Speed Demon", "Geschwindigkeitsdämon", "Demonio de la Velocidad"),
  point_badge!("persistence", 800, Target, "Persistència", "Persistence", "Ausdauer", "Persistencia"),
];

pub static LEVEL_BADGES: [BadgeDef; 15] = [
  level_badge!(1, "Explorador de Fraccions", "Fraction Explorer", "Bruch-Entdecker", "Explorador de Fracciones"),
  level_badge!(2, "Operacions Bàsiques", "Basic Operations", "Grundrechenarten", "Operaciones Básicas"),
  level_badge!(3, "Mestre de Simplificació", "Simplification Master", "Vereinfachungs-Meister", "Maestro de Simplificación"),
  level_badge!(4, "Expert en Suma", "Addition Expert", "Additions-Experte", "Experto en Suma"),
  level_badge!(5, "Campió de Comparació", "Comparison Champion", "Vergleichs-Champion", "Campeón de Comparación"),
  level_badge!(6, "Pro de Multiplicació", "Multiplication Pro", "Multiplikations-Profi", "Pro de Multiplicación"),
  level_badge!(7, "Mestre de Divisió", "Division Master", "Divisions-Meister", "Maestro de División"),
  level_badge!(8, "As d'Operacions Mixtes", "Mixed Operations Ace", "Gemischte-Operationen-Ass", "As de Operaciones Mixtas"),
  level_badge!(9, "Convertidor Decimal", "Decimal Converter", "Dezimal-Konvertierer", "Convertidor Decimal"),
  level_badge!(10, "Simplificador Avançat", "Advanced Simplifier", "Fortgeschrittener Vereinfacher", "Simplificador Avanzado"),
  level_badge!(11, "Heroi de Suma Complexa", "Complex Addition Hero", "Komplexe-Addition-Held", "Héroe de Suma Compleja"),
  level_badge!(12, "Geni de Resta", "Subtraction Genius", "Subtraktions-Genie", "Genio de Resta"),
  level_badge!(13, "Mag de Multiplicació", "Multiplication Wizard", "Multiplikations-Zauberer", "Mago de Multiplicación"),
  level_badge!(14, "Llegenda de Divisió", "Division Legend", "Divisions-Legende", "Leyenda de División"),
  level_badge!(15, "Gran Mestre", "Grand Master", "Großmeister", "Gran Maestro"),
];

pub fn all() -> impl Iterator<Item = &'static BadgeDef> {
  POINT_BADGES.iter().chain(LEVEL_BADGES.iter())
}

fn has(earned: &[String], id: &str) -> bool {
  earned.iter().any(|e| e == id)
}

fn point_threshold(b: &BadgeDef) -> Option<u32> {
  match b.unlock {
    Unlock::Points(t) => Some(t),
    Unlock::Level(_) => None,
  }
}

/// Point badges reached by `total_points` that are not in `earned` yet.
pub fn new_point_badges(total_points: u32, earned: &[String]) -> Vec<&'static str> {
  POINT_BADGES
    .iter()
    .filter(|b| point_threshold(b).is_some_and(|t| total_points >= t) && !has(earned, b.id))
    .map(|b| b.id)
    .collect()
}

/// The level's badge, if `stars` qualifies and it is not already earned.
pub fn level_badge(level: u32, stars: u8, earned: &[String]) -> Option<&'static str> {
  if stars < LEVEL_BADGE_MIN_STARS {
    return None;
  }
  LEVEL_BADGES
    .iter()
    .find(|b| b.unlock == Unlock::Level(level))
    .map(|b| b.id)
    .filter(|id| !has(earned, id))
}

/// Every point badge `total_points` qualifies for.
pub fn earned_point_badges(total_points: u32) -> Vec<&'static str> {
  POINT_BADGES
    .iter()
    .filter(|b| point_threshold(b).is_some_and(|t| total_points >= t))
    .map(|b| b.id)
    .collect()
}

pub fn is_level_badge(id: &str) -> bool {
  LEVEL_BADGES.iter().any(|b| b.id == id)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStatus {
  pub id: &'static str,
  #[serde(rename = "type")]
  pub kind: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub threshold: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub level: Option<u32>,
  pub name: &'static str,
  pub art: BadgeArt,
  pub is_earned: bool,
  pub is_locked: bool,
}

/// Whole catalog with earned/locked flags. Point badges are judged by points,
/// level badges by presence in `earned`.
pub fn all_with_status(total_points: u32, earned: &[String], lang: Language) -> Vec<BadgeStatus> {
  all()
    .map(|b| {
      let (kind, threshold, level, is_earned) = match b.unlock {
        Unlock::Points(t) => ("point", Some(t), None, total_points >= t),
        Unlock::Level(l) => ("level", None, Some(l), has(earned, b.id)),
      };
      BadgeStatus {
        id: b.id,
        kind,
        threshold,
        level,
        name: b.name.get(lang),
        art: b.art,
        is_earned,
        is_locked: !is_earned,
      }
    })
    .collect()
}

pub fn total_earned(total_points: u32, earned: &[String]) -> usize {
  earned_point_badges(total_points).len() + earned.iter().filter(|id| is_level_badge(id)).count()
}
