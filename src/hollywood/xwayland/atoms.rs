// Atoms the window manager interns at startup
//
// Austin Shafer - 2020

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        WM_PROTOCOLS,
        WM_NORMAL_HINTS,
        WM_TAKE_FOCUS,
        WM_DELETE_WINDOW,
        WM_STATE,
        WM_CHANGE_STATE,
        WM_S0,
        WM_CLASS,
        WM_NAME,
        WM_TRANSIENT_FOR,
        _NET_WM_CM_S0,
        _NET_WM_NAME,
        _NET_WM_STATE,
        _NET_WM_STATE_MAXIMIZED_VERT,
        _NET_WM_STATE_MAXIMIZED_HORZ,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_WINDOW_TYPE_NORMAL,
        _NET_WM_WINDOW_TYPE_TOOLTIP,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_DND,
        _NET_WM_WINDOW_TYPE_DROPDOWN_MENU,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_NOTIFICATION,
        _NET_WM_WINDOW_TYPE_POPUP_MENU,
        _NET_WM_WINDOW_TYPE_COMBO,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_MOVERESIZE,
        _NET_SUPPORTING_WM_CHECK,
        _NET_SUPPORTED,
        _NET_ACTIVE_WINDOW,
        _MOTIF_WM_HINTS,
        CLIPBOARD,
        CLIPBOARD_MANAGER,
        TARGETS,
        UTF8_STRING,
        _WL_SELECTION,
        INCR,
        TIMESTAMP,
        MULTIPLE,
        COMPOUND_TEXT,
        TEXT,
        STRING,
        TEXT_PLAIN_UTF8: b"text/plain;charset=utf-8",
        TEXT_PLAIN: b"text/plain",
        WL_SURFACE_ID,
    }
}
