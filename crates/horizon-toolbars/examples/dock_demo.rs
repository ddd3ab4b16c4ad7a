//! Headless toolbar docking walkthrough.
//!
//! Builds a window with a few toolbars, drags one out of its tray so it
//! floats, docks it again and round-trips the layout through the saved
//! state. An optional argument names a TOML dock configuration.
//!
//! Run with: cargo run -p horizon-toolbars --example dock_demo [config.toml]
//!
//! Set `RUST_LOG=horizon_toolbars=debug` to see the engine's own logging.

use horizon_toolbars::prelude::*;
use tracing_subscriber::EnvFilter;

fn print_layout(window: &MainWindow) {
    for index in 0..window.tool_bar_count() {
        let Some(id) = window.tool_bar_at(index) else {
            continue;
        };
        let Some(tool_bar) = window.tool_bar(id) else {
            continue;
        };
        let geometry = tool_bar.geometry();
        println!(
            "  {:<8} {:?} {:?} at ({}, {}) size {}x{}",
            tool_bar.title(),
            window.tool_bar_tray(id),
            tool_bar.dock_state(),
            geometry.left(),
            geometry.top(),
            geometry.width(),
            geometry.height(),
        );
    }
    let central = window.central_rect();
    println!(
        "  central  ({}, {}) size {}x{}",
        central.left(),
        central.top(),
        central.width(),
        central.height()
    );
}

fn add_tool_bar(window: &mut MainWindow, tray: ToolBarTray, name: &str, actions: &[&str]) -> ToolBarId {
    let id = window.create_tool_bar(name);
    if let Some(tool_bar) = window.tool_bar_mut(id) {
        tool_bar.set_object_name(name.to_lowercase());
    }
    for text in actions {
        let action = window
            .actions_mut()
            .insert(Action::new(*text).with_object_name(text.to_lowercase()));
        window.add_action(id, action);
    }
    window.add_tool_bar_to_tray(tray, id);
    id
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => DockConfig::load(&path).expect("Failed to load dock configuration"),
        None => DockConfig::default(),
    };

    println!("Toolbar docking demo");
    println!("====================");

    let mut window = MainWindow::with_config(config);
    let file = add_tool_bar(&mut window, ToolBarTray::Top, "File", &["New", "Open", "Save"]);
    add_tool_bar(&mut window, ToolBarTray::Top, "Edit", &["Cut", "Copy", "Paste"]);
    add_tool_bar(&mut window, ToolBarTray::Left, "Draw", &["Pen", "Brush"]);
    window.set_central_size_hint(Size::new(400, 300));
    window.set_geometry(Rect::new(0, 0, 800, 600));

    println!();
    println!("Initial layout:");
    print_layout(&window);
    let saved = window.save_state();
    println!("Saved state: {} bytes", saved.len());

    // grab the File toolbar by its handle and pull it into the window
    let grab = window
        .tool_bar(file)
        .expect("File toolbar")
        .handle_area()
        .center();
    window.dispatch(PointerEvent::Press {
        pos: grab,
        button: MouseButton::Left,
    });
    window.dispatch(PointerEvent::Move {
        pos: grab + Point::new(200, 250),
    });
    window.dispatch(PointerEvent::Release {
        pos: grab + Point::new(200, 250),
        button: MouseButton::Left,
    });

    println!();
    println!("After dragging File out:");
    print_layout(&window);

    let title = window
        .tool_bar(file)
        .expect("File toolbar")
        .title_area()
        .center();
    window.dispatch(PointerEvent::DoubleClick {
        pos: title,
        button: MouseButton::Left,
    });

    println!();
    println!("After double-clicking its title bar:");
    print_layout(&window);

    window.add_tool_bar_to_tray(ToolBarTray::Bottom, file);
    window.activate_layout();
    println!();
    println!("After moving File to the bottom tray:");
    print_layout(&window);

    if window.restore_state(&saved) {
        println!();
        println!("After restoring the saved state:");
        print_layout(&window);
    }
}
