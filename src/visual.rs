//! Visual fraction building: bars split into equal segments, some of them selected.
//!
//! A bar starts with two partitions and gains one per `add_partition` until it
//! reaches the target denominator. Only such "complete" bars accept selection,
//! either by toggling one segment or by a press/move/release gesture that paints
//! a contiguous range. The answer signal is the total of selected segments over
//! all bars, pushed to listeners as text whenever it changes.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

/// Partitions a freshly added bar starts with.
pub const INITIAL_PARTITIONS: u32 = 2;

/// Receives the selected-segment total ("0", "3", ...).
pub type CountListener = Box<dyn FnMut(&str) + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bar {
  pub id: u32,
  pub partitions: u32,
}

/// In-flight press/drag gesture. Replaced wholesale by every accepted press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DragGesture {
  bar_id: u32,
  start: u32,
  /// Value painted over the dragged range: the inverse of the start segment.
  target: bool,
  moved: bool,
}

pub struct VisualSelection {
  numerator: u32,
  denominator: u32,
  bars: Vec<Bar>,
  // Entries exist only for the bar's current partition count.
  selected: HashMap<u32, BTreeMap<u32, bool>>,
  drag: Option<DragGesture>,
  last_reported: usize,
  listeners: Vec<CountListener>,
}

impl std::fmt::Debug for VisualSelection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("VisualSelection")
      .field("numerator", &self.numerator)
      .field("denominator", &self.denominator)
      .field("bars", &self.bars)
      .field("selected", &self.selected)
      .field("drag", &self.drag)
      .finish_non_exhaustive()
  }
}

impl VisualSelection {
  pub fn new(numerator: u32, denominator: u32) -> Self {
    Self {
      numerator,
      denominator: denominator.max(1),
      bars: Vec::new(),
      selected: HashMap::new(),
      drag: None,
      last_reported: 0,
      listeners: Vec::new(),
    }
  }

  pub fn subscribe(&mut self, listener: CountListener) {
    self.listeners.push(listener);
  }

  pub fn bars(&self) -> &[Bar] {
    &self.bars
  }

  /// Point the model at another fraction. Changing the pair discards every bar
  /// and selection and reports "0"; the same pair leaves the model untouched.
  pub fn rekey(&mut self, numerator: u32, denominator: u32) -> bool {
    let denominator = denominator.max(1);
    if numerator == self.numerator && denominator == self.denominator {
      return false;
    }
    self.numerator = numerator;
    self.denominator = denominator;
    self.reset();
    true
  }

  /// Drop all bars, selections and gesture state, and report "0".
  pub fn reset(&mut self) {
    self.bars.clear();
    self.selected.clear();
    self.drag = None;
    self.last_reported = 0;
    debug!(target: "visual", numerator = self.numerator, denominator = self.denominator, "visual model reset");
    self.emit("0");
  }

  /// The first bar is always allowed; more only for improper fractions.
  pub fn can_add_bar(&self) -> bool {
    self.bars.is_empty() || self.numerator > self.denominator
  }

  pub fn add_bar(&mut self) -> Option<u32> {
    if !self.can_add_bar() {
      return None;
    }
    let id = self.bars.iter().map(|b| b.id).max().map_or(1, |m| m + 1);
    self.bars.push(Bar { id, partitions: INITIAL_PARTITIONS.min(self.denominator) });
    self.selected.insert(id, BTreeMap::new());
    debug!(target: "visual", bar_id = id, "bar added");
    Some(id)
  }

  /// Split a bar one step further, never beyond the denominator.
  ///
  /// The bar's selection is cleared in the same step, also when the cap leaves
  /// the count unchanged. Returns whether the partition count grew.
  pub fn add_partition(&mut self, bar_id: u32) -> bool {
    let denominator = self.denominator;
    let Some(bar) = self.bars.iter_mut().find(|b| b.id == bar_id) else {
      return false;
    };
    let before = bar.partitions;
    bar.partitions = (before + 1).min(denominator);
    let grew = bar.partitions != before;

    self.selected.insert(bar_id, BTreeMap::new());
    if self.drag.is_some_and(|d| d.bar_id == bar_id) {
      self.drag = None;
    }
    debug!(target: "visual", bar_id, partitions = before + u32::from(grew), "partition added");
    self.notify();
    grew
  }

  pub fn is_complete(&self, bar_id: u32) -> bool {
    self.bar(bar_id).is_some_and(|b| b.partitions == self.denominator)
  }

  pub fn is_selected(&self, bar_id: u32, segment: u32) -> bool {
    self
      .selected
      .get(&bar_id)
      .and_then(|m| m.get(&segment))
      .copied()
      .unwrap_or(false)
  }

  pub fn bar_selected_count(&self, bar_id: u32) -> usize {
    self.selected.get(&bar_id).map_or(0, |m| m.values().filter(|s| **s).count())
  }

  pub fn selected_count(&self) -> usize {
    self.selected.values().map(|m| m.values().filter(|s| **s).count()).sum()
  }

  /// The answer signal, as fed to the answer check.
  pub fn selected_count_text(&self) -> String {
    self.selected_count().to_string()
  }

  /// Whether the current selection represents the target fraction.
  pub fn matches_numerator(&self) -> bool {
    self.selected_count() == self.numerator as usize
  }

  pub fn is_dragging(&self) -> bool {
    self.drag.is_some()
  }

  /// Click: flip a single segment.
  pub fn toggle(&mut self, bar_id: u32, segment: u32) -> bool {
    if !self.interactive(bar_id, segment) {
      return false;
    }
    let entry = self.selected.entry(bar_id).or_default().entry(segment).or_insert(false);
    *entry = !*entry;
    self.notify();
    true
  }

  /// Pointer down on a segment. Nothing changes until move or release.
  pub fn press(&mut self, bar_id: u32, segment: u32) -> bool {
    if !self.interactive(bar_id, segment) {
      return false;
    }
    self.drag = Some(DragGesture {
      bar_id,
      start: segment,
      target: !self.is_selected(bar_id, segment),
      moved: false,
    });
    true
  }

  /// Pointer entered a segment while pressed: paint from the start segment to here.
  pub fn move_to(&mut self, bar_id: u32, segment: u32) -> bool {
    let Some(drag) = self.drag.as_mut() else {
      return false;
    };
    if drag.bar_id != bar_id {
      return false;
    }
    drag.moved = true;
    let gesture = *drag;
    if !self.interactive(bar_id, segment) {
      return false;
    }

    let (lo, hi) = (gesture.start.min(segment), gesture.start.max(segment));
    let bar = self.selected.entry(bar_id).or_default();
    for i in lo..=hi {
      bar.insert(i, gesture.target);
    }
    self.notify();
    true
  }

  /// Pointer released over a segment. Without any move in between, this is a
  /// click on the pressed segment.
  pub fn release(&mut self, bar_id: u32, segment: u32) -> bool {
    let Some(drag) = self.drag.take() else {
      return false;
    };
    if !drag.moved && drag.bar_id == bar_id && drag.start == segment {
      return self.toggle(bar_id, segment);
    }
    false
  }

  /// Pointer released away from every segment: abandon the gesture.
  pub fn release_outside(&mut self) {
    self.drag = None;
  }

  pub fn snapshot(&self) -> VisualSnapshot {
    VisualSnapshot {
      numerator: self.numerator,
      denominator: self.denominator,
      bars: self
        .bars()
        .iter()
        .map(|b| BarView {
          id: b.id,
          partitions: b.partitions,
          complete: b.partitions == self.denominator,
          selected: (0..b.partitions).map(|i| self.is_selected(b.id, i)).collect(),
          selected_count: self.bar_selected_count(b.id),
        })
        .collect(),
      selected_count: self.selected_count(),
      matches_numerator: self.matches_numerator(),
      can_add_bar: self.can_add_bar(),
      dragging: self.is_dragging(),
    }
  }

  fn bar(&self, bar_id: u32) -> Option<&Bar> {
    self.bars.iter().find(|b| b.id == bar_id)
  }

  fn interactive(&self, bar_id: u32, segment: u32) -> bool {
    self.is_complete(bar_id) && segment < self.denominator
  }

  fn notify(&mut self) {
    let total = self.selected_count();
    if total != self.last_reported {
      self.last_reported = total;
      self.emit(&total.to_string());
    }
  }

  fn emit(&mut self, count: &str) {
    for listener in &mut self.listeners {
      listener(count);
    }
  }
}

/// Serializable view of the model for the frontend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSnapshot {
  pub numerator: u32,
  pub denominator: u32,
  pub bars: Vec<BarView>,
  pub selected_count: usize,
  pub matches_numerator: bool,
  pub can_add_bar: bool,
  pub dragging: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarView {
  pub id: u32,
  pub partitions: u32,
  pub complete: bool,
  pub selected: Vec<bool>,
  pub selected_count: usize,
}
