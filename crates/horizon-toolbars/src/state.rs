//! Persisted toolbar layout.
//!
//! The layout is saved as a versioned binary record:
//!
//! ```text
//! [version:i32][toolbar_count:i32]
//! 4 x tray (Top, Left, Right, Bottom):
//!   [row_count:i32]
//!   row_count x [item_count:i32]
//!     item_count x [is_custom:bool][pos:i32][name:string][is_hidden:bool]
//!                  [is_floating:bool][floating_x:i32][floating_y:i32]
//!                  [break_count:i32][break:i32]*
//!                  [action_count:i32]([is_separator:bool][name:string])*
//! ```
//!
//! Integers are big-endian, booleans one byte, strings a big-endian `u32`
//! byte length followed by UTF-8. Decoding validates the whole record
//! before anything is applied, so a failed restore leaves the live layout
//! untouched.

use bytes::{Buf, BufMut};
use horizon_toolbars_core::Point;

use crate::error::{Result, StateError};
use crate::tray::ToolBarTray;

/// Version tag written at the front of every record.
pub const STATE_VERSION: i32 = 1;

// ============================================================================
// Records
// ============================================================================

/// Persisted action entry of a toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionState {
    pub is_separator: bool,
    /// Object name of the action; empty for separators.
    pub name: String,
}

/// Persisted item layout of a toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolBarLayoutState {
    /// Row breaks of the dynamic layout, empty when never adjusted.
    pub row_breaks: Vec<i32>,
}

/// Persisted contents of a toolbar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolBarState {
    pub layout: ToolBarLayoutState,
    pub actions: Vec<ActionState>,
}

/// Persisted toolbar in a tray row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrayItemState {
    pub is_custom: bool,
    /// Position along the tray.
    pub pos: i32,
    /// Title for custom toolbars, object name otherwise.
    pub name: String,
    pub is_hidden: bool,
    pub is_floating: bool,
    /// Window position while floating, zero otherwise.
    pub floating_pos: Point,
    pub tool_bar_state: ToolBarState,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrayRowState {
    pub items: Vec<TrayItemState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrayState {
    pub rows: Vec<TrayRowState>,
}

impl TrayState {
    /// Number of toolbars in all rows.
    pub fn item_count(&self) -> usize {
        self.rows.iter().map(|row| row.items.len()).sum()
    }
}

/// Persisted layout of all four trays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutState {
    pub trays: [TrayState; 4],
}

impl LayoutState {
    pub fn tray(&self, tray: ToolBarTray) -> &TrayState {
        &self.trays[tray.index()]
    }

    pub fn tray_mut(&mut self, tray: ToolBarTray) -> &mut TrayState {
        &mut self.trays[tray.index()]
    }

    /// Number of toolbars in all trays.
    pub fn tool_bar_count(&self) -> usize {
        self.trays.iter().map(TrayState::item_count).sum()
    }

    /// Encode to the binary record.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_i32(STATE_VERSION);
        put_count(&mut buf, self.tool_bar_count());
        for tray in &self.trays {
            put_count(&mut buf, tray.rows.len());
            for row in &tray.rows {
                put_count(&mut buf, row.items.len());
                for item in &row.items {
                    encode_item(&mut buf, item);
                }
            }
        }
        buf
    }

    /// Decode a binary record.
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        let reader = &mut data;
        let version = get_i32(reader, "version")?;
        if version != STATE_VERSION {
            return Err(StateError::VersionMismatch {
                found: version,
                expected: STATE_VERSION,
            });
        }
        let expected = get_i32(reader, "toolbar count")?;

        let mut state = LayoutState::default();
        for tray in &mut state.trays {
            let row_count = get_count(reader, "row")?;
            tray.rows = (0..row_count)
                .map(|_| -> Result<TrayRowState> {
                    let item_count = get_count(reader, "tray item")?;
                    let items = (0..item_count)
                        .map(|_| decode_item(reader))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(TrayRowState { items })
                })
                .collect::<Result<Vec<_>>>()?;
        }

        let found = i32::try_from(state.tool_bar_count()).unwrap_or(i32::MAX);
        if found != expected {
            return Err(StateError::CountMismatch { expected, found });
        }
        Ok(state)
    }
}

// ============================================================================
// Encoding
// ============================================================================

fn put_count(buf: &mut Vec<u8>, count: usize) {
    debug_assert!(count <= i32::MAX as usize, "count {count} does not fit an i32");
    // saturates in release builds
    buf.put_i32(i32::try_from(count).unwrap_or(i32::MAX));
}

fn put_bool(buf: &mut Vec<u8>, value: bool) {
    buf.put_u8(u8::from(value));
}

fn put_string(buf: &mut Vec<u8>, value: &str) {
    debug_assert!(value.len() <= u32::MAX as usize, "string of {} bytes", value.len());
    // release builds truncate, keeping the length prefix in step with the bytes
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    buf.put_u32(len);
    buf.put_slice(&value.as_bytes()[..len as usize]);
}

fn encode_item(buf: &mut Vec<u8>, item: &TrayItemState) {
    put_bool(buf, item.is_custom);
    buf.put_i32(item.pos);
    put_string(buf, &item.name);
    put_bool(buf, item.is_hidden);
    put_bool(buf, item.is_floating);
    buf.put_i32(item.floating_pos.x);
    buf.put_i32(item.floating_pos.y);

    let state = &item.tool_bar_state;
    put_count(buf, state.layout.row_breaks.len());
    for &end in &state.layout.row_breaks {
        buf.put_i32(end);
    }
    put_count(buf, state.actions.len());
    for action in &state.actions {
        put_bool(buf, action.is_separator);
        put_string(buf, &action.name);
    }
}

// ============================================================================
// Decoding
// ============================================================================

fn ensure(reader: &&[u8], needed: usize, context: &'static str) -> Result<()> {
    let remaining = reader.remaining();
    if remaining < needed {
        return Err(StateError::truncated(context, needed - remaining));
    }
    Ok(())
}

fn get_i32(reader: &mut &[u8], context: &'static str) -> Result<i32> {
    ensure(reader, 4, context)?;
    Ok(reader.get_i32())
}

fn get_bool(reader: &mut &[u8], context: &'static str) -> Result<bool> {
    ensure(reader, 1, context)?;
    Ok(reader.get_u8() != 0)
}

/// Read a count. Every counted entry takes at least one byte, so a count
/// larger than the remaining data is rejected before allocating.
fn get_count(reader: &mut &[u8], context: &'static str) -> Result<usize> {
    let count = get_i32(reader, context)?;
    match usize::try_from(count) {
        Ok(n) if n <= reader.remaining() => Ok(n),
        _ => Err(StateError::InvalidCount { context, count }),
    }
}

fn get_string(reader: &mut &[u8], context: &'static str) -> Result<String> {
    ensure(reader, 4, context)?;
    let len = reader.get_u32() as usize;
    ensure(reader, len, context)?;
    let bytes = reader.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec()).map_err(|_| StateError::InvalidString)
}

fn decode_item(reader: &mut &[u8]) -> Result<TrayItemState> {
    let is_custom = get_bool(reader, "custom flag")?;
    let pos = get_i32(reader, "position")?;
    let name = get_string(reader, "toolbar name")?;
    let is_hidden = get_bool(reader, "hidden flag")?;
    let is_floating = get_bool(reader, "floating flag")?;
    let x = get_i32(reader, "floating position")?;
    let y = get_i32(reader, "floating position")?;

    let break_count = get_count(reader, "row break")?;
    let row_breaks = (0..break_count)
        .map(|_| get_i32(reader, "row break"))
        .collect::<Result<Vec<_>>>()?;

    let action_count = get_count(reader, "action")?;
    let actions = (0..action_count)
        .map(|_| -> Result<ActionState> {
            Ok(ActionState {
                is_separator: get_bool(reader, "separator flag")?,
                name: get_string(reader, "action name")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TrayItemState {
        is_custom,
        pos,
        name,
        is_hidden,
        is_floating,
        floating_pos: Point::new(x, y),
        tool_bar_state: ToolBarState {
            layout: ToolBarLayoutState { row_breaks },
            actions,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LayoutState {
        let mut state = LayoutState::default();
        state.tray_mut(ToolBarTray::Top).rows = vec![TrayRowState {
            items: vec![
                TrayItemState {
                    pos: 12,
                    name: "file".into(),
                    tool_bar_state: ToolBarState {
                        layout: ToolBarLayoutState {
                            row_breaks: vec![2, 4],
                        },
                        actions: vec![
                            ActionState {
                                is_separator: false,
                                name: "open".into(),
                            },
                            ActionState {
                                is_separator: true,
                                name: String::new(),
                            },
                        ],
                    },
                    ..TrayItemState::default()
                },
                TrayItemState {
                    is_custom: true,
                    name: "My Tools".into(),
                    is_hidden: true,
                    ..TrayItemState::default()
                },
            ],
        }];
        state.tray_mut(ToolBarTray::Bottom).rows = vec![TrayRowState {
            items: vec![TrayItemState {
                name: "édition".into(),
                is_floating: true,
                floating_pos: Point::new(-40, 300),
                ..TrayItemState::default()
            }],
        }];
        state
    }

    #[test]
    fn test_round_trip() {
        let state = sample();
        let bytes = state.encode();
        assert_eq!(LayoutState::decode(&bytes), Ok(state));
    }

    #[test]
    fn test_header_layout() {
        let bytes = LayoutState::default().encode();
        // version, count, then four empty trays
        assert_eq!(bytes.len(), 4 * 6);
        assert_eq!(&bytes[..8], &[0, 0, 0, 1, 0, 0, 0, 0]);

        let bytes = sample().encode();
        assert_eq!(&bytes[4..8], &[0, 0, 0, 3]);
    }

    #[test]
    fn test_version_mismatch() {
        let mut bytes = sample().encode();
        bytes[3] = 2;
        assert_eq!(
            LayoutState::decode(&bytes),
            Err(StateError::VersionMismatch {
                found: 2,
                expected: STATE_VERSION
            })
        );
    }

    #[test]
    fn test_truncated_at_every_length() {
        let bytes = sample().encode();
        for len in 0..bytes.len() {
            assert!(
                LayoutState::decode(&bytes[..len]).is_err(),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn test_count_mismatch() {
        let mut bytes = sample().encode();
        bytes[7] = 5;
        assert_eq!(
            LayoutState::decode(&bytes),
            Err(StateError::CountMismatch {
                expected: 5,
                found: 3
            })
        );
    }

    #[test]
    fn test_negative_count() {
        let mut bytes = LayoutState::default().encode();
        bytes[8..12].copy_from_slice(&(-1i32).to_be_bytes());
        assert_eq!(
            LayoutState::decode(&bytes),
            Err(StateError::InvalidCount {
                context: "row",
                count: -1
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let mut state = LayoutState::default();
        state.tray_mut(ToolBarTray::Left).rows = vec![TrayRowState {
            items: vec![TrayItemState {
                name: "ab".into(),
                ..TrayItemState::default()
            }],
        }];
        let mut bytes = state.encode();
        // version, count, top rows, left rows, item count, custom flag, pos, len
        let name_at = 4 + 4 + 4 + 4 + 4 + 1 + 4 + 4;
        bytes[name_at] = 0xff;
        assert_eq!(LayoutState::decode(&bytes), Err(StateError::InvalidString));
    }

    #[test]
    fn test_length_prefixes() {
        let mut buf = Vec::new();
        put_count(&mut buf, 3);
        put_string(&mut buf, "ab");
        assert_eq!(buf, vec![0, 0, 0, 3, 0, 0, 0, 2, b'a', b'b']);
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "does not fit an i32")]
    fn test_oversized_count_panics_in_debug() {
        put_count(&mut Vec::new(), i32::MAX as usize + 1);
    }
}
