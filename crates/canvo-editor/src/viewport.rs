//! Viewport math: fitting the workspace into the container and zooming
//! around a fixed screen point.

use canvo_core::{Affine, Point, Rect, Size};

/// Scale that fits `workspace` into `container`, shrunk by `margin`.
pub fn fit_zoom(container: Size, workspace: Size, margin: f64) -> Option<f64> {
    if workspace.width <= 0.0 || workspace.height <= 0.0 {
        return None;
    }
    let scale = (container.width / workspace.width).min(container.height / workspace.height);
    Some(scale * margin)
}

/// Transform that scales the workspace by [`fit_zoom`] and puts its center
/// at the center of the container.
pub fn fit_transform(container: Size, workspace: Rect, margin: f64) -> Option<Affine> {
    let zoom = fit_zoom(container, workspace.size(), margin)?;
    let center = workspace.center();
    Some(Affine::new([
        zoom,
        0.0,
        0.0,
        zoom,
        container.width / 2.0 - center.x * zoom,
        container.height / 2.0 - center.y * zoom,
    ]))
}

/// Change the zoom of `current` to `zoom` keeping the scene point under
/// screen `point` fixed.
pub fn zoom_at(current: Affine, point: Point, zoom: f64) -> Affine {
    let [z, _, _, _, tx, ty] = current.as_coeffs();
    if z == 0.0 {
        return Affine::new([zoom, 0.0, 0.0, zoom, tx, ty]);
    }
    let scene_x = (point.x - tx) / z;
    let scene_y = (point.y - ty) / z;
    Affine::new([
        zoom,
        0.0,
        0.0,
        zoom,
        point.x - scene_x * zoom,
        point.y - scene_y * zoom,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fit_uses_smaller_axis() {
        let zoom = fit_zoom(Size::new(1000.0, 600.0), Size::new(900.0, 1200.0), 0.85).unwrap();
        assert!((zoom - 0.425).abs() < 1e-9);
        assert_eq!(fit_zoom(Size::new(10.0, 10.0), Size::ZERO, 0.85), None);
    }

    #[test]
    fn fit_centers_workspace() {
        let ws = Rect::new(100.0, 100.0, 300.0, 200.0);
        let t = fit_transform(Size::new(400.0, 400.0), ws, 1.0).unwrap();
        let center = t * ws.center();
        assert!((center.x - 200.0).abs() < 1e-9);
        assert!((center.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let current = Affine::new([0.5, 0.0, 0.0, 0.5, 30.0, 40.0]);
        let anchor = Point::new(200.0, 150.0);
        let scene_pt = current.inverse() * anchor;
        let next = zoom_at(current, anchor, 0.8);
        let back = next * scene_pt;
        assert!((back.x - anchor.x).abs() < 1e-9);
        assert!((back.y - anchor.y).abs() < 1e-9);
    }
}
