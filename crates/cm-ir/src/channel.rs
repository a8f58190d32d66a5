//! Speaker positions, channel sets and layout descriptors.

use alloc::string::{String, ToString};
use arrayvec::ArrayVec;
use core::fmt;
use core::str::FromStr;

/// Number of distinct physical speaker positions.
pub const CHANNEL_COUNT: usize = 9;

/// A physical speaker position.
///
/// Variants are declared in canonical interleave order: a buffer carrying a
/// given [`ChannelSet`] stores its samples in this order within each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Left,
    Right,
    MiddleLeft,
    MiddleRight,
    RearLeft,
    RearRight,
    RearCenter,
    Center,
    Lfe,
}

impl Channel {
    /// All positions in interleave order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Left,
        Channel::Right,
        Channel::MiddleLeft,
        Channel::MiddleRight,
        Channel::RearLeft,
        Channel::RearRight,
        Channel::RearCenter,
        Channel::Center,
        Channel::Lfe,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Short display label.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Left => "L",
            Channel::Right => "R",
            Channel::MiddleLeft => "ML",
            Channel::MiddleRight => "MR",
            Channel::RearLeft => "RL",
            Channel::RearRight => "RR",
            Channel::RearCenter => "RC",
            Channel::Center => "C",
            Channel::Lfe => "LFE",
        }
    }

    /// Look up a position by its label (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ch| ch.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An unordered set of speaker positions.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelSet {
    members: [bool; CHANNEL_COUNT],
}

impl ChannelSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self {
            members: [false; CHANNEL_COUNT],
        }
    }

    pub fn from_channels(channels: &[Channel]) -> Self {
        channels.iter().copied().collect()
    }

    /// Add a position. Returns `false` if it was already present.
    pub fn insert(&mut self, ch: Channel) -> bool {
        let was_present = self.members[ch.index()];
        self.members[ch.index()] = true;
        !was_present
    }

    /// Remove a position. Returns `false` if it was absent.
    pub fn remove(&mut self, ch: Channel) -> bool {
        let was_present = self.members[ch.index()];
        self.members[ch.index()] = false;
        was_present
    }

    pub fn contains(&self, ch: Channel) -> bool {
        self.members[ch.index()]
    }

    pub fn contains_any(&self, channels: &[Channel]) -> bool {
        channels.iter().any(|&ch| self.contains(ch))
    }

    pub fn len(&self) -> usize {
        self.members.iter().filter(|&&present| present).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate members in interleave order.
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(move |&ch| self.contains(ch))
    }

    /// Members in interleave order, collected without allocating.
    pub fn channels(&self) -> ArrayVec<Channel, CHANNEL_COUNT> {
        self.iter().collect()
    }

    /// Interleave index of `ch` within a frame of this set.
    pub fn position(&self, ch: Channel) -> Option<usize> {
        self.iter().position(|member| member == ch)
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut set = ChannelSet::empty();
        for ch in iter {
            set.insert(ch);
        }
        set
    }
}

impl fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (i, ch) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(ch.label())?;
        }
        Ok(())
    }
}

/// Describes an audio format's channel configuration.
///
/// `physical` is the set of positions actually carried by the interleaved
/// samples. `original` records the source intent; it differs from
/// `physical` when, for instance, one side of a dual-mono pair has been
/// picked for playback. `dual_mono` marks a two-channel signal holding two
/// unrelated mono programs; `reverse_stereo` asks for left and right to be
/// swapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChannelLayout {
    pub physical: ChannelSet,
    pub original: ChannelSet,
    pub dual_mono: bool,
    pub reverse_stereo: bool,
}

impl ChannelLayout {
    /// A plain layout whose original channels equal its physical channels.
    pub fn new(physical: ChannelSet) -> Self {
        Self {
            physical,
            original: physical,
            dual_mono: false,
            reverse_stereo: false,
        }
    }

    fn of(channels: &[Channel]) -> Self {
        Self::new(ChannelSet::from_channels(channels))
    }

    /// Interleave stride.
    pub fn channel_count(&self) -> usize {
        self.physical.len()
    }

    pub fn with_original(mut self, original: ChannelSet) -> Self {
        self.original = original;
        self
    }

    pub fn with_dual_mono(mut self, dual_mono: bool) -> Self {
        self.dual_mono = dual_mono;
        self
    }

    pub fn with_reverse_stereo(mut self, reverse_stereo: bool) -> Self {
        self.reverse_stereo = reverse_stereo;
        self
    }

    pub fn mono() -> Self {
        Self::of(&[Channel::Center])
    }

    pub fn stereo() -> Self {
        Self::of(&[Channel::Left, Channel::Right])
    }

    /// Two independent mono programs on a stereo pair.
    pub fn dual_mono() -> Self {
        Self::stereo().with_dual_mono(true)
    }

    pub fn reverse_stereo() -> Self {
        Self::stereo().with_reverse_stereo(true)
    }

    /// Single left speaker carrying the left program of a dual-mono pair.
    pub fn mono_left() -> Self {
        Self::of(&[Channel::Left])
    }

    /// Single right speaker carrying the right program of a dual-mono pair.
    pub fn mono_right() -> Self {
        Self::of(&[Channel::Right])
    }

    pub fn surround_2_1() -> Self {
        Self::of(&[Channel::Left, Channel::Right, Channel::Lfe])
    }

    pub fn surround_3_0() -> Self {
        Self::of(&[Channel::Left, Channel::Right, Channel::Center])
    }

    pub fn quad() -> Self {
        Self::of(&[
            Channel::Left,
            Channel::Right,
            Channel::RearLeft,
            Channel::RearRight,
        ])
    }

    pub fn surround_5_0() -> Self {
        Self::of(&[
            Channel::Left,
            Channel::Right,
            Channel::RearLeft,
            Channel::RearRight,
            Channel::Center,
        ])
    }

    pub fn surround_5_1() -> Self {
        Self::of(&[
            Channel::Left,
            Channel::Right,
            Channel::RearLeft,
            Channel::RearRight,
            Channel::Center,
            Channel::Lfe,
        ])
    }

    pub fn surround_6_1() -> Self {
        Self::of(&[
            Channel::Left,
            Channel::Right,
            Channel::RearLeft,
            Channel::RearRight,
            Channel::RearCenter,
            Channel::Center,
            Channel::Lfe,
        ])
    }

    pub fn surround_7_1() -> Self {
        Self::of(&[
            Channel::Left,
            Channel::Right,
            Channel::MiddleLeft,
            Channel::MiddleRight,
            Channel::RearLeft,
            Channel::RearRight,
            Channel::Center,
            Channel::Lfe,
        ])
    }

    /// Default layout for a bare channel count.
    pub fn from_count(channels: usize) -> Option<Self> {
        Some(match channels {
            1 => Self::mono(),
            2 => Self::stereo(),
            3 => Self::surround_3_0(),
            4 => Self::quad(),
            5 => Self::surround_5_0(),
            6 => Self::surround_5_1(),
            7 => Self::surround_6_1(),
            8 => Self::surround_7_1(),
            9 => Self::of(&Channel::ALL),
            _ => return None,
        })
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.physical)?;
        if self.original != self.physical {
            write!(f, " (from {})", self.original)?;
        }
        if self.dual_mono {
            f.write_str(" dual-mono")?;
        }
        if self.reverse_stereo {
            f.write_str(" reversed")?;
        }
        Ok(())
    }
}

/// Error returned when a layout name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel layout `{0}`")]
pub struct ParseLayoutError(pub String);

impl FromStr for ChannelLayout {
    type Err = ParseLayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let preset = match name.to_ascii_lowercase().as_str() {
            "mono" | "1.0" => Some(Self::mono()),
            "stereo" | "2.0" => Some(Self::stereo()),
            "2.1" => Some(Self::surround_2_1()),
            "3.0" => Some(Self::surround_3_0()),
            "quad" | "4.0" => Some(Self::quad()),
            "5.0" => Some(Self::surround_5_0()),
            "5.1" => Some(Self::surround_5_1()),
            "6.1" => Some(Self::surround_6_1()),
            "7.1" => Some(Self::surround_7_1()),
            "dual-mono" | "dualmono" => Some(Self::dual_mono()),
            "reverse-stereo" | "reversed" => Some(Self::reverse_stereo()),
            "mono-left" => Some(Self::mono_left()),
            "mono-right" => Some(Self::mono_right()),
            _ => None,
        };
        if let Some(layout) = preset {
            return Ok(layout);
        }

        let mut physical = ChannelSet::empty();
        for label in name.split('+') {
            let ch = Channel::from_label(label.trim())
                .ok_or_else(|| ParseLayoutError(name.to_string()))?;
            physical.insert(ch);
        }
        if physical.is_empty() {
            return Err(ParseLayoutError(name.to_string()));
        }
        Ok(Self::new(physical))
    }
}
