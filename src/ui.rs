//! User interface rendering: the projected view, the minimap and the status lines.

use color_eyre::eyre::Result;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::{
    game::Game,
    map::{GridMap, GridPos},
    objective::OBJECTIVE_TILE,
    ray::{HitKind, RayHit},
    types::Screen,
    App,
};

/// Shortest distance used for wall heights, keeping slices finite when the eye touches a wall.
const MIN_WALL_DISTANCE: f64 = 0.05;

/// Wall glyphs from nearest to farthest.
const SHADE_FULL: char = '\u{2588}';
/// Dark shade, used both for the closest band and for the second band.
const SHADE_DARK: char = '\u{2593}';
/// Medium shade.
const SHADE_MEDIUM: char = '\u{2592}';
/// Light shade.
const SHADE_LIGHT: char = '\u{2591}';

/// Colour of walls, the minimap and the chrome.
const THEME: Color = Color::Green;

/// Renders one frame of the application.
///
/// This function lays out the status line, the projected view next to the minimap, and the control
/// hints, and overlays the pause block when the world is paused.
///
/// # Errors
///
/// This function may return errors from data conversion when the map is too large to draw.
pub(crate) fn draw(app: &App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let [status_area, main_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let minimap_width = u16::try_from(app.game.map.width())?.saturating_add(2);
    let [view_area, minimap_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(minimap_width)])
            .areas(main_area);

    let hits = app.game.project(usize::from(view_area.width));

    frame.render_widget(status_line(&app.game, app.clock.fps()), status_area);
    frame.render_widget(
        Paragraph::new(view_lines(&hits, view_area.height, app.game.max_depth())),
        view_area,
    );
    minimap(frame, &app.game, &hits, minimap_area)?;
    hint_bar(frame, hint_area);

    if app.screen == Screen::Paused {
        pause_overlay(frame);
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
///
/// This function renders a clear widget over the entire area of the frame to prepare for
/// rendering new content without artifacts from previous buffers rendered on the same frame.
pub(crate) fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Builds the status line with position, heading, field of view, frame rate, score and route.
pub(crate) fn status_line(game: &Game, fps: f64) -> Line<'static> {
    let player = &game.player;
    Line::styled(
        format!(
            "X={:3.2} Y={:3.2} A={:3.2}pi FOV={:3.2}pi FPS={:3.2} SCORE={} PATH={}",
            player.position.x,
            player.position.y,
            player.heading / std::f64::consts::PI,
            player.fov / std::f64::consts::PI,
            fps,
            game.score,
            game.path.len(),
        ),
        Style::default().fg(THEME),
    )
}

/// Returns the glyph for a wall slice at `distance`, given the view depth.
///
/// Slices on a cell corner are left blank so that neighbouring faces read as separate blocks.
pub(crate) fn wall_shade(distance: f64, max_depth: f64, boundary: bool) -> char {
    if boundary {
        ' '
    } else if distance < 0.5 {
        SHADE_DARK
    } else if distance < max_depth / 3.5 {
        SHADE_FULL
    } else if distance < max_depth / 3. {
        SHADE_DARK
    } else if distance < max_depth / 2. {
        SHADE_MEDIUM
    } else if distance < max_depth {
        SHADE_LIGHT
    } else {
        ' '
    }
}

/// Returns the glyph for a floor cell on `row` of a view `rows` tall.
///
/// Rows nearer the bottom of the view are nearer the eye and drawn denser.
pub(crate) fn floor_shade(row: f64, rows: f64) -> char {
    let half = rows / 2.;
    let remoteness = 1. - (row - half) / half;

    if remoteness < 0.25 {
        '#'
    } else if remoteness < 0.5 {
        'x'
    } else if remoteness < 0.75 {
        '.'
    } else {
        ' '
    }
}

/// Turns projected column hits into the rows of the view.
///
/// Each column is split into ceiling, wall slice and floor. The wall slice spans from
/// `rows / 2 - rows / distance` to its mirror image, so nearer walls are taller.
pub(crate) fn view_lines(hits: &[RayHit], height: u16, max_depth: f64) -> Vec<Line<'static>> {
    let rows = f64::from(height);
    let wall_style = Style::default().fg(THEME);
    let target_style = Style::default().fg(Color::Red);
    let floor_style = Style::default().fg(Color::DarkGray);

    let slices: Vec<(f64, f64, char, Style)> = hits
        .iter()
        .map(|hit| {
            let distance = hit.distance.max(MIN_WALL_DISTANCE);
            let ceiling = rows / 2. - rows / distance;
            let (glyph, style) = match hit.kind {
                HitKind::Wall => (wall_shade(distance, max_depth, hit.boundary), wall_style),
                HitKind::Target => (wall_shade(distance, max_depth, hit.boundary), target_style),
                HitKind::None | HitKind::OutOfBounds => (' ', Style::default()),
            };

            (ceiling, rows - ceiling, glyph, style)
        })
        .collect();

    (0..height)
        .map(|row| {
            let row = f64::from(row);
            let spans: Vec<Span<'static>> = slices
                .iter()
                .map(|&(ceiling, floor, glyph, style)| {
                    if row <= ceiling {
                        Span::raw(" ")
                    } else if row <= floor {
                        Span::styled(glyph.to_string(), style)
                    } else {
                        Span::styled(floor_shade(row, rows).to_string(), floor_style)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Transforms grid coordinates to canvas coordinates centred on the map.
///
/// This function converts grid coordinates (col, row) to canvas coordinates (x, y) with the
/// formulas x = col - (cols - 1) / 2 and y = (rows - 1) / 2 - row, so the map is centred on the
/// canvas origin and rows grow downwards on screen.
///
/// # Errors
///
/// This function may return errors when the map dimensions do not fit in a `u16`.
pub(crate) fn transform_grid_to_canvas_coords(
    cells: impl IntoIterator<Item = GridPos>,
    map: &GridMap,
) -> Result<Vec<(f64, f64)>> {
    let rows_n = f64::from(u16::try_from(map.height())?);
    let cols_n = f64::from(u16::try_from(map.width())?);

    Ok(cells
        .into_iter()
        .map(|cell| {
            (
                f64::from(cell.x) - (cols_n - 1.) / 2.,
                (rows_n - 1.) / 2. - f64::from(cell.y),
            )
        })
        .collect())
}

/// Renders the minimap: walls, ray trails, the guidance path, shots, the objective and the player.
///
/// # Errors
///
/// This function may return errors from coordinate conversion operations.
pub(crate) fn minimap(frame: &mut Frame, game: &Game, hits: &[RayHit], area: Rect) -> Result<()> {
    let block = Block::bordered()
        .title("Map")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(THEME))
        .border_type(BorderType::Rounded);
    let space = block.inner(area);
    frame.render_widget(block, area);

    let map = &game.map;
    let walls = transform_grid_to_canvas_coords(map.blocked_cells(), map)?;
    let trails = transform_grid_to_canvas_coords(
        hits.iter().flat_map(|hit| hit.trail.iter().copied()),
        map,
    )?;
    let path = transform_grid_to_canvas_coords(game.path.iter().copied(), map)?;
    let shots = transform_grid_to_canvas_coords(
        game.shots
            .iter()
            .filter_map(|shot| GridPos::containing(shot.position)),
        map,
    )?;
    let markers = transform_grid_to_canvas_coords(
        [Some(game.objective.cell), game.player.cell()]
            .into_iter()
            .flatten(),
        map,
    )?;
    let objective = markers.first().copied();
    let player = markers.get(1).copied();
    let player_tile = game.player.tile();

    let canvas = Canvas::default()
        .x_bounds([
            (-rounded_div::i32(space.width.into(), 2)).into(),
            (rounded_div::i32(space.width.into(), 2)).into(),
        ])
        .y_bounds([
            (-rounded_div::i32(space.height.into(), 2)).into(),
            (rounded_div::i32(space.height.into(), 2)).into(),
        ])
        .marker(Marker::Dot)
        .paint(|ctx| {
            ctx.draw(&Points {
                coords: &walls,
                color: THEME,
            });
            ctx.draw(&Points {
                coords: &trails,
                color: Color::DarkGray,
            });
            ctx.draw(&Points {
                coords: &path,
                color: Color::Yellow,
            });
            ctx.draw(&Points {
                coords: &shots,
                color: Color::White,
            });
            if let Some((x, y)) = objective {
                ctx.print(x, y, Line::styled(OBJECTIVE_TILE.to_string(), Color::Red));
            }
            if let Some((x, y)) = player {
                ctx.print(x, y, Line::styled(player_tile.to_string(), Color::White));
            }
        });

    frame.render_widget(canvas, space);

    Ok(())
}

/// Renders the control hints along the bottom edge.
pub(crate) fn hint_bar(frame: &mut Frame, area: Rect) {
    let block = Block::bordered()
        .title(
            "(w/s) move / (a/d) turn / (space) widen / (q) reset fov / (f) fire / (p) pause / (esc) quit",
        )
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(THEME))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);

    frame.render_widget(block, area);
}

/// Renders the pause block centred over the frame.
pub(crate) fn pause_overlay(frame: &mut Frame) {
    let [space] = Layout::vertical([Constraint::Length(3)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [space] = Layout::horizontal([Constraint::Length(30)])
        .flex(Flex::Center)
        .areas(space);

    let block = Block::bordered()
        .title("Paused")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(THEME))
        .border_type(BorderType::Rounded);
    let text = Paragraph::new(Line::raw("(p) resume / (esc) quit").centered()).block(block);

    frame.render_widget(Clear, space);
    frame.render_widget(text, space);
}
