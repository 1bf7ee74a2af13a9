use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// A sheet of paper, in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaperSize {
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
}

impl PaperSize {
    pub const A4: PaperSize = PaperSize { name: "A4", width: 210.0, height: 297.0 };
    pub const A3: PaperSize = PaperSize { name: "A3", width: 297.0, height: 420.0 };
    pub const LETTER: PaperSize = PaperSize { name: "Letter", width: 215.9, height: 279.4 };

    pub const PRESETS: [PaperSize; 3] = [Self::A4, Self::A3, Self::LETTER];

    pub fn custom(width: f32, height: f32) -> Self {
        PaperSize { name: "Custom", width, height }
    }
}

impl FromStr for PaperSize {
    type Err = Error;

    /// `a4`, `a3`, `letter` (case-insensitive) or `WIDTHxHEIGHT` in mm.
    fn from_str(s: &str) -> Result<Self, Error> {
        let key = s.trim().to_ascii_lowercase();
        if let Some(preset) = Self::PRESETS.iter().find(|p| p.name.to_ascii_lowercase() == key) {
            return Ok(*preset);
        }
        let d = Dimensions::from_str(&key)
            .map_err(|_| Error::InvalidConfig(format!("unknown paper size '{s}'")))?;
        Ok(PaperSize::custom(d.width, d.height))
    }
}

/// Plain width/height pair in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl FromStr for Dimensions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let bad = || Error::InvalidConfig(format!("expected WIDTHxHEIGHT in mm, got '{s}'"));
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(bad)?;
        let width: f32 = w.trim().parse().map_err(|_| bad())?;
        let height: f32 = h.trim().parse().map_err(|_| bad())?;
        Ok(Dimensions { width, height })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardSize {
    Poker,
    Tarot,
    MagicTheGathering,
    YuGiOh,
    ThreeKingdomsKill,
    Hearthstone,
    Catan,
    TicketToRide,
    /// Size comes from `PrintConfig::custom_card_size`.
    Custom,
}

impl CardSize {
    pub const ALL: [CardSize; 9] = [
        CardSize::Poker,
        CardSize::Tarot,
        CardSize::MagicTheGathering,
        CardSize::YuGiOh,
        CardSize::ThreeKingdomsKill,
        CardSize::Hearthstone,
        CardSize::Catan,
        CardSize::TicketToRide,
        CardSize::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CardSize::Poker => "Poker",
            CardSize::Tarot => "Tarot",
            CardSize::MagicTheGathering => "Magic: The Gathering",
            CardSize::YuGiOh => "Yu-Gi-Oh!",
            CardSize::ThreeKingdomsKill => "Three Kingdoms Kill",
            CardSize::Hearthstone => "Hearthstone",
            CardSize::Catan => "Catan",
            CardSize::TicketToRide => "Ticket to Ride",
            CardSize::Custom => "Custom",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CardSize::Poker => "poker",
            CardSize::Tarot => "tarot",
            CardSize::MagicTheGathering => "mtg",
            CardSize::YuGiOh => "yugioh",
            CardSize::ThreeKingdomsKill => "sgs",
            CardSize::Hearthstone => "hearthstone",
            CardSize::Catan => "catan",
            CardSize::TicketToRide => "ticket-to-ride",
            CardSize::Custom => "custom",
        }
    }

    /// Preset dimensions; `None` for `Custom`.
    pub fn dimensions(self) -> Option<Dimensions> {
        let (width, height) = match self {
            CardSize::Poker | CardSize::MagicTheGathering => (63.0, 88.0),
            CardSize::Tarot => (70.0, 120.0),
            CardSize::YuGiOh => (59.0, 86.0),
            CardSize::ThreeKingdomsKill => (62.0, 87.0),
            CardSize::Hearthstone => (65.0, 90.0),
            CardSize::Catan => (75.0, 110.0),
            CardSize::TicketToRide => (68.0, 92.0),
            CardSize::Custom => return None,
        };
        Some(Dimensions { width, height })
    }
}

impl FromStr for CardSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown card size '{s}'")))
    }
}

/// Page margins in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(mm: f32) -> Self {
        Margins { top: mm, right: mm, bottom: mm, left: mm }
    }

    pub fn scaled(self, k: f32) -> Self {
        Margins {
            top: self.top * k,
            right: self.right * k,
            bottom: self.bottom * k,
            left: self.left * k,
        }
    }
}

impl FromStr for Margins {
    type Err = Error;

    /// One value for all sides, or four comma-separated values in
    /// top,right,bottom,left order.
    fn from_str(s: &str) -> Result<Self, Error> {
        let vals = parse_mm_list(s)?;
        match vals[..] {
            [all] => Ok(Margins::uniform(all)),
            [top, right, bottom, left] => Ok(Margins { top, right, bottom, left }),
            _ => Err(Error::InvalidConfig(format!(
                "margins take 1 or 4 values, got '{s}'"
            ))),
        }
    }
}

/// Gap between adjacent cards in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spacing {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Spacing {
    pub fn uniform(mm: f32) -> Self {
        Spacing { horizontal: mm, vertical: mm }
    }

    pub fn scaled(self, k: f32) -> Self {
        Spacing { horizontal: self.horizontal * k, vertical: self.vertical * k }
    }
}

impl FromStr for Spacing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let vals = parse_mm_list(s)?;
        match vals[..] {
            [all] => Ok(Spacing::uniform(all)),
            [horizontal, vertical] => Ok(Spacing { horizontal, vertical }),
            _ => Err(Error::InvalidConfig(format!(
                "spacing takes 1 or 2 values, got '{s}'"
            ))),
        }
    }
}

fn parse_mm_list(s: &str) -> Result<Vec<f32>, Error> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| Error::InvalidConfig(format!("'{v}' is not a length in mm")))
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    FrontOnly,
    BackOnly,
    /// Alternating front and back pages for double-sided printing.
    Duplex,
    /// Alternating faces card by card within a page.
    Merged,
}

impl FromStr for DisplayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "front_only" | "front" => Ok(DisplayMode::FrontOnly),
            "back_only" | "back" => Ok(DisplayMode::BackOnly),
            "duplex" => Ok(DisplayMode::Duplex),
            "merged" => Ok(DisplayMode::Merged),
            _ => Err(Error::InvalidConfig(format!("unknown display mode '{s}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipDirection {
    /// Book-style flip.
    #[default]
    LongEdge,
    /// Calendar-style flip.
    ShortEdge,
}

impl FromStr for FlipDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "long_edge" | "long" => Ok(FlipDirection::LongEdge),
            "short_edge" | "short" => Ok(FlipDirection::ShortEdge),
            _ => Err(Error::InvalidConfig(format!("unknown flip direction '{s}'"))),
        }
    }
}

/// Which side of a card is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
}

/// Resolution multiplier applied to paper and card dimensions at render time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quality(pub f32);

impl Quality {
    pub const LOW: Quality = Quality(1.0);
    pub const MEDIUM: Quality = Quality(1.5);
    pub const HIGH: Quality = Quality(2.0);
    /// Largest accepted factor. Past this the per-card bitmap stops being a
    /// sensible allocation.
    pub const MAX: Quality = Quality(8.0);
}

impl Default for Quality {
    fn default() -> Self {
        Quality::LOW
    }
}

impl FromStr for Quality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::LOW),
            "medium" => Ok(Quality::MEDIUM),
            "high" => Ok(Quality::HIGH),
            other => other
                .parse::<f32>()
                .map(Quality)
                .map_err(|_| Error::InvalidConfig(format!("unknown quality '{s}'"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintConfig {
    pub paper: PaperSize,
    pub card_size: CardSize,
    pub custom_card_size: Dimensions,
    pub margins: Margins,
    pub spacing: Spacing,
    pub display_mode: DisplayMode,
    pub flip_direction: FlipDirection,
    pub quality: Quality,
}

impl Default for PrintConfig {
    fn default() -> Self {
        PrintConfig {
            paper: PaperSize::A4,
            card_size: CardSize::Poker,
            custom_card_size: Dimensions { width: 63.0, height: 88.0 },
            margins: Margins::uniform(5.0),
            spacing: Spacing::uniform(5.0),
            display_mode: DisplayMode::FrontOnly,
            flip_direction: FlipDirection::LongEdge,
            quality: Quality::LOW,
        }
    }
}

impl PrintConfig {
    /// Card dimensions with the custom override resolved.
    pub fn card_dimensions(&self) -> Dimensions {
        self.card_size.dimensions().unwrap_or(self.custom_card_size)
    }

    /// Smallest card edge in millimeters.
    pub const MIN_CARD_SIZE: f32 = 1.0;

    /// Rejects geometry that can never describe a sheet. Capacity (whether a
    /// card actually fits) is checked by the layout, not here.
    pub fn validate(&self) -> Result<(), Error> {
        let positive = |what: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{what} must be positive, got {v}")))
            }
        };
        let non_negative = |what: &str, v: f32| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{what} must not be negative, got {v}")))
            }
        };

        positive("paper width", self.paper.width)?;
        positive("paper height", self.paper.height)?;
        let card = self.card_dimensions();
        positive("card width", card.width)?;
        positive("card height", card.height)?;
        if card.width < Self::MIN_CARD_SIZE || card.height < Self::MIN_CARD_SIZE {
            return Err(Error::InvalidConfig(format!(
                "card must be at least {} mm on each side, got {}x{}",
                Self::MIN_CARD_SIZE,
                card.width,
                card.height
            )));
        }
        non_negative("top margin", self.margins.top)?;
        non_negative("right margin", self.margins.right)?;
        non_negative("bottom margin", self.margins.bottom)?;
        non_negative("left margin", self.margins.left)?;
        non_negative("horizontal spacing", self.spacing.horizontal)?;
        non_negative("vertical spacing", self.spacing.vertical)?;
        positive("quality", self.quality.0)?;
        if self.quality.0 > Quality::MAX.0 {
            return Err(Error::InvalidConfig(format!(
                "quality must be at most {}, got {}",
                Quality::MAX.0,
                self.quality.0
            )));
        }
        Ok(())
    }
}

/// Holds the active configuration plus an editable draft. Edits only touch
/// the draft; `apply` swaps it in as a whole.
#[derive(Clone, Debug, Default)]
pub struct ConfigEditor {
    active: PrintConfig,
    draft: PrintConfig,
}

impl ConfigEditor {
    pub fn new(config: PrintConfig) -> Self {
        ConfigEditor { draft: config.clone(), active: config }
    }

    pub fn active(&self) -> &PrintConfig {
        &self.active
    }

    pub fn draft(&self) -> &PrintConfig {
        &self.draft
    }

    pub fn set_paper(&mut self, paper: PaperSize) -> &mut Self {
        self.draft.paper = paper;
        self
    }

    pub fn set_card_size(&mut self, size: CardSize) -> &mut Self {
        self.draft.card_size = size;
        self
    }

    pub fn set_custom_card_size(&mut self, size: Dimensions) -> &mut Self {
        self.draft.custom_card_size = size;
        self
    }

    pub fn set_margins(&mut self, margins: Margins) -> &mut Self {
        self.draft.margins = margins;
        self
    }

    pub fn set_spacing(&mut self, spacing: Spacing) -> &mut Self {
        self.draft.spacing = spacing;
        self
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> &mut Self {
        self.draft.display_mode = mode;
        self
    }

    pub fn set_flip_direction(&mut self, flip: FlipDirection) -> &mut Self {
        self.draft.flip_direction = flip;
        self
    }

    pub fn set_quality(&mut self, quality: Quality) -> &mut Self {
        self.draft.quality = quality;
        self
    }

    pub fn has_changes(&self) -> bool {
        self.active != self.draft
    }

    /// Validate the draft and make it the active config. On error the active
    /// config is left untouched and the draft is kept for correction.
    pub fn apply(&mut self) -> Result<&PrintConfig, Error> {
        self.draft.validate()?;
        self.active = self.draft.clone();
        log::debug!("Applied print config: {:?}", self.active);
        Ok(&self.active)
    }

    pub fn discard(&mut self) {
        self.draft = self.active.clone();
    }
}

/// A card record as stored by the backend. The layout engine never looks
/// inside; unknown fields ride along in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backimage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardtype: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Card {
    /// Artwork reference for the given face, if any.
    pub fn artwork(&self, face: Face) -> Option<&str> {
        let src = match face {
            Face::Front => self.image.as_deref(),
            Face::Back => self.backimage.as_deref(),
        };
        src.filter(|s| !s.trim().is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CardsPayload {
    Wrapped { cards: Vec<Card> },
    Bare(Vec<Card>),
}

/// Parse either a `{"cards": [...]}` response body or a bare card array.
pub fn parse_cards(json: &[u8]) -> Result<Vec<Card>, Error> {
    let payload: CardsPayload = serde_json::from_slice(json)?;
    Ok(match payload {
        CardsPayload::Wrapped { cards } => cards,
        CardsPayload::Bare(cards) => cards,
    })
}
