// Clipboard bridge between X clients and wayland clients
//
// X clients own the CLIPBOARD selection and answer conversions, wayland
// clients offer data sources. We sit in the middle with our own
// selection window: taking ownership of CLIPBOARD when a wayland client
// sets the selection, and converting into our window when an X client
// does.
//
// Transfers larger than one chunk use the INCR protocol in both
// directions.
//
// Austin Shafer - 2020
use super::event::{SelectionEvent, SelectionTarget, XAtom, XWindow};
use super::x11::{SelectionProperty, XConnection};
use utils::{log, Result};

use std::collections::VecDeque;

/// Largest property we write in one go
pub const INCR_CHUNK_SIZE: usize = 64 * 1024;

/// Results for the wayland side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardEvent {
    /// An X client set the clipboard with these mime types
    XOffer(Vec<String>),
    /// Data requested with `request_data`
    XData { mime: String, data: Vec<u8> },
    /// The X owner went away
    XCleared,
}

/// A conversion into our window that hasn't finished
#[derive(Debug, Clone, PartialEq)]
enum Incoming {
    Idle,
    Targets,
    Data { mime: String },
    Incr { mime: String, data: Vec<u8> },
}

/// An INCR transfer to an X requestor
#[derive(Debug)]
struct OutgoingIncr {
    oi_requestor: XWindow,
    oi_property: XAtom,
    oi_offset: usize,
    /// The zero length terminator has been written
    oi_done: bool,
}

pub struct SelectionBridge {
    sb_x_owner: Option<XWindow>,
    sb_incoming: Incoming,
    /// What a wayland client put on the clipboard
    sb_wayland_mimes: Vec<String>,
    sb_wayland_data: Option<Vec<u8>>,
    sb_outgoing: Vec<OutgoingIncr>,
    sb_events: VecDeque<ClipboardEvent>,
}

impl SelectionBridge {
    pub fn new() -> Self {
        Self {
            sb_x_owner: None,
            sb_incoming: Incoming::Idle,
            sb_wayland_mimes: Vec::new(),
            sb_wayland_data: None,
            sb_outgoing: Vec::new(),
            sb_events: VecDeque::new(),
        }
    }

    pub fn get_next_clipboard_event(&mut self) -> Option<ClipboardEvent> {
        self.sb_events.pop_front()
    }

    /// A wayland client set the clipboard
    pub fn set_wayland_selection(
        &mut self,
        conn: &mut dyn XConnection,
        mimes: Vec<String>,
        data: Vec<u8>,
    ) -> Result<()> {
        log::debug!("Wayland selection offered as {:?}", mimes);
        self.sb_wayland_mimes = mimes;
        self.sb_wayland_data = Some(data);
        self.sb_x_owner = None;
        conn.own_clipboard(true)
    }

    pub fn clear_wayland_selection(&mut self, conn: &mut dyn XConnection) -> Result<()> {
        if self.sb_wayland_data.take().is_some() {
            self.sb_wayland_mimes.clear();
            self.sb_outgoing.clear();
            conn.own_clipboard(false)?;
        }
        Ok(())
    }

    /// A wayland client wants the X clipboard as `mime`
    pub fn request_data(&mut self, conn: &mut dyn XConnection, mime: &str) -> Result<()> {
        if self.sb_x_owner.is_none() {
            log::debug!("No X selection to convert to {}", mime);
            return Ok(());
        }

        let target = match SelectionTarget::from_mime_type(mime) {
            Some(t) => t,
            None => {
                log::error!("Can't convert the X selection to {}", mime);
                return Ok(());
            }
        };

        self.sb_incoming = Incoming::Data {
            mime: mime.to_string(),
        };
        conn.convert_clipboard(target)
    }

    pub fn handle_event(&mut self, conn: &mut dyn XConnection, ev: SelectionEvent) -> Result<()> {
        match ev {
            SelectionEvent::OwnerChanged { owner: Some(owner) } => {
                log::debug!("X window {} owns the clipboard", owner);
                self.sb_x_owner = Some(owner);
                self.sb_wayland_data = None;
                self.sb_wayland_mimes.clear();
                self.sb_incoming = Incoming::Targets;
                conn.convert_clipboard(SelectionTarget::Targets)?;
            }
            SelectionEvent::OwnerChanged { owner: None } => {
                if self.sb_x_owner.take().is_some() {
                    self.sb_incoming = Incoming::Idle;
                    self.sb_events.push_back(ClipboardEvent::XCleared);
                }
            }
            SelectionEvent::Notify { target, success } => {
                if !success {
                    log::debug!("Conversion of the X selection to {:?} was refused", target);
                    self.sb_incoming = Incoming::Idle;
                    return Ok(());
                }
                let prop = conn.read_selection()?;
                self.handle_incoming(prop);
            }
            SelectionEvent::ChunkReady => {
                if let Incoming::Incr { .. } = self.sb_incoming {
                    let prop = conn.read_selection()?;
                    self.handle_incoming(prop);
                }
            }
            SelectionEvent::Request {
                requestor,
                target,
                property,
                time,
            } => self.handle_request(conn, requestor, target, property, time)?,
        }
        Ok(())
    }

    fn handle_incoming(&mut self, prop: SelectionProperty) {
        let incoming = std::mem::replace(&mut self.sb_incoming, Incoming::Idle);

        match (incoming, prop) {
            (Incoming::Targets, SelectionProperty::Targets(targets)) => {
                let mut mimes: Vec<String> = Vec::new();
                for t in targets.iter() {
                    if let Some(mime) = t.mime_type() {
                        if !mimes.iter().any(|m| m == mime) {
                            mimes.push(mime.to_string());
                        }
                    }
                }
                self.sb_events.push_back(ClipboardEvent::XOffer(mimes));
            }
            (Incoming::Data { mime }, SelectionProperty::Data(data)) => {
                self.sb_events.push_back(ClipboardEvent::XData { mime, data });
            }
            (Incoming::Data { mime }, SelectionProperty::Incr(size)) => {
                log::debug!("Incremental X selection transfer of {} bytes", size);
                self.sb_incoming = Incoming::Incr {
                    mime,
                    data: Vec::with_capacity(size as usize),
                };
            }
            (Incoming::Incr { mime, data }, SelectionProperty::Data(chunk)) if chunk.is_empty() => {
                self.sb_events.push_back(ClipboardEvent::XData { mime, data });
            }
            (Incoming::Incr { mime, mut data }, SelectionProperty::Data(chunk)) => {
                data.extend_from_slice(&chunk);
                self.sb_incoming = Incoming::Incr { mime, data };
            }
            (state, prop) => {
                log::error!("Unexpected selection data {:?} while in {:?}", prop, state);
            }
        }
    }

    fn handle_request(
        &mut self,
        conn: &mut dyn XConnection,
        requestor: XWindow,
        target: SelectionTarget,
        property: XAtom,
        time: u32,
    ) -> Result<()> {
        let data = match self.sb_wayland_data.as_ref() {
            Some(d) => d,
            None => return conn.send_selection_notify(requestor, target, None, time),
        };

        match target {
            SelectionTarget::Targets => {
                let mut targets = vec![SelectionTarget::Targets];
                if self
                    .sb_wayland_mimes
                    .iter()
                    .any(|m| SelectionTarget::from_mime_type(m).is_some())
                {
                    targets.push(SelectionTarget::Utf8String);
                    targets.push(SelectionTarget::Text);
                    targets.push(SelectionTarget::String);
                }
                conn.write_selection(requestor, property, &SelectionProperty::Targets(targets))?;
            }
            SelectionTarget::Utf8String | SelectionTarget::Text | SelectionTarget::String => {
                if data.len() > INCR_CHUNK_SIZE {
                    conn.watch_property_changes(requestor)?;
                    conn.write_selection(
                        requestor,
                        property,
                        &SelectionProperty::Incr(data.len() as u32),
                    )?;
                    self.sb_outgoing.push(OutgoingIncr {
                        oi_requestor: requestor,
                        oi_property: property,
                        oi_offset: 0,
                        oi_done: false,
                    });
                } else {
                    conn.write_selection(
                        requestor,
                        property,
                        &SelectionProperty::Data(data.clone()),
                    )?;
                }
            }
            _ => {
                log::debug!("Refusing selection conversion to {:?}", target);
                return conn.send_selection_notify(requestor, target, None, time);
            }
        }

        conn.send_selection_notify(requestor, target, Some(property), time)
    }

    /// A requestor deleted a property, which asks for the next INCR chunk
    ///
    /// Returns false if no transfer of ours was waiting on it.
    pub fn property_deleted(
        &mut self,
        conn: &mut dyn XConnection,
        window: XWindow,
        property: XAtom,
    ) -> Result<bool> {
        let index = match self
            .sb_outgoing
            .iter()
            .position(|o| o.oi_requestor == window && o.oi_property == property)
        {
            Some(i) => i,
            None => return Ok(false),
        };

        let data = match self.sb_wayland_data.as_ref() {
            Some(d) => d,
            None => {
                self.sb_outgoing.remove(index);
                return Ok(true);
            }
        };

        let out = &mut self.sb_outgoing[index];
        if out.oi_done {
            self.sb_outgoing.remove(index);
            return Ok(true);
        }

        let end = (out.oi_offset + INCR_CHUNK_SIZE).min(data.len());
        let chunk = data[out.oi_offset..end].to_vec();
        // an empty chunk ends the transfer
        out.oi_done = chunk.is_empty();
        out.oi_offset = end;
        conn.write_selection(window, property, &SelectionProperty::Data(chunk))?;
        Ok(true)
    }
}
