//! Inventory string grammar
//!
//! Entries are separated by `%%`. Each entry is a material with optional
//! comma-separated modifiers, a `:` and the slots it fills:
//!
//! | Slot part | Meaning |
//! |-----------|---------|
//! | `5` / `5,16` | slot 5, optionally with a stack of 16 |
//! | `[1,3-5]` / `[1,3-5]x8` | every listed slot, one shared amount |
//! | `{1-3:4,9:64}` | per-range amounts |
//!
//! Slots are 1-indexed and clamped into the grid, amounts into 1-64. A
//! trailing integer modifier is the durability percent, clamped into 0-100.

use crate::error::{GeneratorError, Result};

pub const MAX_STACK: u32 = 64;

/// One parsed entry of an inventory string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub material: String,
    /// Modifiers after the material, durability removed
    pub modifiers: Vec<String>,
    pub durability: Option<i32>,
    /// `(slot, amount)` pairs; slots are 1-indexed
    pub placements: Vec<(usize, u32)>,
}

/// Parse an inventory string for a grid of `total_slots` slots.
///
/// Blank entries (a trailing `%%`) are skipped.
pub fn parse_inventory(input: &str, total_slots: usize) -> Result<Vec<InventoryEntry>> {
    if total_slots == 0 {
        return Err(GeneratorError::invalid("Inventory has no slots"));
    }
    input
        .split("%%")
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_entry(entry, total_slots))
        .collect()
}

fn parse_entry(entry: &str, total_slots: usize) -> Result<InventoryEntry> {
    let separator = find_slot_separator(entry).ok_or_else(|| {
        GeneratorError::invalid(format!(
            "Incorrect amount of components present in item: `{}` (missing a valid slot separator `:`)",
            entry
        ))
    })?;
    let (head, slots) = (entry[..separator].trim(), entry[separator + 1..].trim());
    let (material, modifiers, durability) = split_material(head);

    let placements = if slots.contains('{') {
        placements_from_map(slots, total_slots)?
    } else if slots.contains('[') {
        placements_from_list(slots, total_slots)?
    } else {
        vec![single_placement(slots, total_slots).map_err(|_| {
            GeneratorError::invalid(format!("Invalid slot or amount: `{}` for material: `{}`", slots, head))
        })?]
    };

    Ok(InventoryEntry { material, modifiers, durability, placements })
}

/// First `:` outside braces and brackets that is not part of a namespaced
/// id such as `minecraft:stone`.
fn find_slot_separator(entry: &str) -> Option<usize> {
    let (mut braces, mut brackets) = (0usize, 0usize);
    for (index, ch) in entry.char_indices() {
        match ch {
            '{' => braces += 1,
            '}' => braces = braces.saturating_sub(1),
            '[' => brackets += 1,
            ']' => brackets = brackets.saturating_sub(1),
            ':' if braces == 0 && brackets == 0 => {
                let next = entry[index + 1..].chars().find(|c| !c.is_whitespace())?;
                if !next.is_alphabetic() {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_material(head: &str) -> (String, Vec<String>, Option<i32>) {
    let mut parts = head.split(',').map(str::trim);
    let material = parts.next().unwrap_or_default().to_string();
    let mut modifiers: Vec<String> = parts.filter(|part| !part.is_empty()).map(str::to_string).collect();

    let durability = modifiers.last().and_then(|last| last.parse::<i64>().ok()).map(|value| value.clamp(0, 100) as i32);
    if durability.is_some() {
        modifiers.pop();
    }
    (material, modifiers, durability)
}

fn parse_number(text: &str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| GeneratorError::invalid(format!("Invalid slot: `{}`", text.trim())))
}

fn fit_amount(value: i64) -> u32 {
    value.clamp(1, MAX_STACK as i64) as u32
}

fn fit_slot(value: i64, total_slots: usize) -> usize {
    value.clamp(1, total_slots as i64) as usize
}

/// Comma-separated slots and `a-b` ranges
fn parse_slot_ranges(text: &str, total_slots: usize) -> Result<Vec<usize>> {
    let mut slots = Vec::new();
    for value in text.split(',').map(str::trim) {
        if value.contains('-') {
            let bounds: Vec<&str> = value.split('-').collect();
            if bounds.len() != 2 {
                return Err(GeneratorError::invalid(format!("Invalid range format: `{}`", value)));
            }
            let start = fit_slot(parse_number(bounds[0])?, total_slots);
            let end = fit_slot(parse_number(bounds[1])?, total_slots);
            if start > end {
                return Err(GeneratorError::invalid(format!(
                    "Start slot cannot be greater than end slot in range: `{}`",
                    value
                )));
            }
            slots.extend(start..=end);
        } else {
            slots.push(fit_slot(parse_number(value)?, total_slots));
        }
    }
    Ok(slots)
}

/// `{1-3:4,9:64}`
fn placements_from_map(text: &str, total_slots: usize) -> Result<Vec<(usize, u32)>> {
    let start = text.find('{').map_or(0, |i| i + 1);
    let end = text.find('}').unwrap_or(text.len()).max(start);
    let mut placements = Vec::new();

    for pair in text[start..end].split(',') {
        let parts: Vec<&str> = pair.split(':').collect();
        if parts.len() != 2 {
            return Err(GeneratorError::invalid(format!(
                "Invalid slot or amount format: `{}` in slot data: `{}`",
                pair.trim(),
                text
            )));
        }
        let amount = fit_amount(parse_number(parts[1])?);
        for slot in parse_slot_ranges(parts[0], total_slots)? {
            placements.push((slot, amount));
        }
    }
    Ok(placements)
}

/// `[1,3-5]x8`; anything but digits after the bracket is ignored
fn placements_from_list(text: &str, total_slots: usize) -> Result<Vec<(usize, u32)>> {
    let start = text.find('[').map_or(0, |i| i + 1);
    let (inner, amount) = match text.find(']') {
        Some(end) => {
            let digits: String = text[end..].chars().filter(char::is_ascii_digit).collect();
            (&text[start..end.max(start)], digits.parse::<i64>().map(fit_amount).unwrap_or(1))
        }
        None => (&text[start..], 1),
    };
    Ok(parse_slot_ranges(inner, total_slots)?.into_iter().map(|slot| (slot, amount)).collect())
}

/// `5` or `5,16`; an unreadable amount counts as 1
fn single_placement(text: &str, total_slots: usize) -> Result<(usize, u32)> {
    let (slot, amount) = match text.split_once(',') {
        Some((slot, amount)) => (slot, amount.trim().parse::<i64>().map(fit_amount).unwrap_or(1)),
        None => (text, 1),
    };
    Ok((fit_slot(parse_number(slot)?, total_slots), amount))
}
