//! Wrap-around cursor over a fixed set of options.

use std::sync::{Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use itertools::Itertools;

use crate::error::Result;

type Apply = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;
type OnChange = Box<dyn Fn() + Send + Sync>;

struct Cursor {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
    index: usize,
}

/// An ordered, duplicate-free list of labels with a current position.
///
/// Selecting a label first hands it to `apply` (e.g. to actually switch the
/// keyboard layout). Only if that succeeds does the cursor move and
/// `on_change` run, typically waking the owning engine.
///
/// All methods lock the cursor, so click handlers on other threads may call
/// them while the engine loop renders.
pub struct CyclicSelector {
    cursor: Mutex<Cursor>,
    apply: Apply,
    on_change: OnChange,
}

impl CyclicSelector {
    /// Build a selector over `labels`, deduplicated by first occurrence.
    ///
    /// `current` is the label that is active right now. It is appended when
    /// the configured list does not contain it.
    pub fn new<I, S, A, C>(labels: I, current: Option<&str>, apply: A, on_change: C) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        A: Fn(&str) -> Result<()> + Send + Sync + 'static,
        C: Fn() + Send + Sync + 'static,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).unique().collect();
        let mut positions: HashMap<String, usize> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();

        let index = match current {
            Some(current) => match positions.get(current) {
                Some(&i) => i,
                None => {
                    positions.insert(current.to_string(), labels.len());
                    labels.push(current.to_string());
                    labels.len() - 1
                }
            },
            None => 0,
        };

        Self {
            cursor: Mutex::new(Cursor {
                labels,
                positions,
                index,
            }),
            apply: Box::new(apply),
            on_change: Box::new(on_change),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn next(&self) {
        let mut cursor = self.lock();
        let target = cursor.index as isize + 1;
        self.select(&mut cursor, target);
    }

    pub fn previous(&self) {
        let mut cursor = self.lock();
        let target = cursor.index as isize - 1;
        self.select(&mut cursor, target);
    }

    /// Select `label`. Labels that are not part of the list are ignored.
    pub fn set(&self, label: &str) {
        let mut cursor = self.lock();
        let Some(&index) = cursor.positions.get(label) else {
            return;
        };
        self.select(&mut cursor, index as isize);
    }

    pub fn labels(&self) -> Vec<String> {
        self.lock().labels.clone()
    }

    pub fn index(&self) -> usize {
        self.lock().index
    }

    pub fn current(&self) -> Option<String> {
        let cursor = self.lock();
        cursor.labels.get(cursor.index).cloned()
    }

    fn select(&self, cursor: &mut Cursor, target: isize) {
        let count = cursor.labels.len() as isize;
        if count == 0 {
            return;
        }

        let index = target.rem_euclid(count) as usize;
        if let Err(err) = (self.apply)(cursor.labels[index].as_str()) {
            tracing::warn!(%err, label = %cursor.labels[index], "failed to apply selection");
            return;
        }

        cursor.index = index;
        (self.on_change)();
    }
}
