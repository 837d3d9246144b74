use super::*;
use crate::foundation::config::RenderConfig;
use crate::level::camera::Camera;
use crate::level::model::Level;

fn cfg() -> RenderConfig {
    RenderConfig {
        cell_size: 2,
        capture_width_cells: 10,
        capture_height_cells: 10,
        margin_cells: 0,
        depths: 1,
        sublayers_per_depth: 1,
    }
}

fn level_with(cells: &[((i64, i64), Connection)]) -> Level {
    let mut level = Level::new("t", 8, 8, 1);
    for &((x, y), c) in cells {
        level.set_connection(x, y, c);
    }
    level
}

#[test]
fn straight_run_from_entrance_to_exit() {
    let level = level_with(&[
        ((1, 3), Connection::Entrance),
        ((2, 3), Connection::Path),
        ((3, 3), Connection::Path),
        ((4, 3), Connection::Path),
        ((5, 3), Connection::Exit),
    ]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let paths = trace_all(&sampler);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 5);
    assert_eq!(paths[0].kind, PathKind::Exit);
    assert_eq!(paths[0].entrance(), Some((1, 3)));
    assert_eq!(paths[0].terminal(), Some((5, 3)));
}

#[test]
fn t_junction_steps_toward_stem() {
    let lrt = Neighbors::from_dirs(&[Dir::Left, Dir::Up, Dir::Right]);
    assert_eq!(step_direction(lrt, Some(Dir::Left)), Some(Dir::Up));
    assert_eq!(step_direction(lrt, Some(Dir::Right)), Some(Dir::Up));

    let level = level_with(&[
        ((1, 4), Connection::Entrance),
        ((2, 4), Connection::Path),
        ((3, 4), Connection::Path),
        ((3, 3), Connection::Exit),
        ((4, 4), Connection::Spawn),
    ]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let path = trace_from(&sampler, (1, 4));
    assert_eq!(path.cells, vec![(1, 4), (2, 4), (3, 4), (3, 3)]);
    assert_eq!(path.kind, PathKind::Exit);
}

#[test]
fn cross_continues_straight() {
    let all = Neighbors::from_dirs(&Dir::ALL);
    assert_eq!(step_direction(all, Some(Dir::Left)), Some(Dir::Right));
    assert_eq!(step_direction(all, Some(Dir::Down)), Some(Dir::Up));
}

#[test]
fn arriving_at_stem_falls_back_to_priority_order() {
    let lrt = Neighbors::from_dirs(&[Dir::Left, Dir::Up, Dir::Right]);
    assert_eq!(step_direction(lrt, Some(Dir::Up)), Some(Dir::Right));
}

#[test]
fn visited_cells_are_never_chosen_over_open_ones() {
    // at (2,2) the T-junction fallback prefers Right, which is already on the path
    let level = level_with(&[
        ((4, 2), Connection::Entrance),
        ((3, 2), Connection::Path),
        ((3, 1), Connection::Path),
        ((2, 1), Connection::Path),
        ((2, 2), Connection::Path),
        ((1, 2), Connection::Exit),
    ]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let path = trace_from(&sampler, (4, 2));
    assert_eq!(
        path.cells,
        vec![(4, 2), (3, 2), (3, 1), (2, 1), (2, 2), (1, 2)]
    );
    assert_eq!(path.kind, PathKind::Exit);
}

#[test]
fn path_into_nothing_is_dead() {
    let level = level_with(&[
        ((0, 0), Connection::Entrance),
        ((0, 1), Connection::Path),
        ((0, 2), Connection::Path),
    ]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let path = trace_from(&sampler, (0, 0));
    assert_eq!(path.len(), 3);
    assert_eq!(path.kind, PathKind::Dead);
}

#[test]
fn shortcut_between_entrances_is_traced_from_both_ends() {
    let level = level_with(&[
        ((1, 1), Connection::Entrance),
        ((2, 1), Connection::Path),
        ((3, 1), Connection::Entrance),
    ]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let paths = trace_all(&sampler);
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.kind == PathKind::Shortcut && p.len() == 3));
    assert_eq!(paths[1].cells, vec![(3, 1), (2, 1), (1, 1)]);
}

#[test]
fn loops_terminate() {
    let level = level_with(&[
        ((1, 1), Connection::Entrance),
        ((2, 1), Connection::Path),
        ((3, 1), Connection::Path),
        ((3, 2), Connection::Path),
        ((2, 2), Connection::Path),
        ((2, 3), Connection::Path),
    ]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let path = trace_from(&sampler, (1, 1));
    assert_eq!(path.kind, PathKind::Dead);
    assert!(path.len() <= 6);
}

#[test]
fn lone_entrance_is_dead() {
    let level = level_with(&[((4, 4), Connection::Entrance)]);
    let sampler = GeoSampler::new(&level, &Camera::at(0.0, 0.0), &cfg());
    let path = trace_from(&sampler, (4, 4));
    assert_eq!(path.len(), 1);
    assert_eq!(path.kind, PathKind::Dead);
}
