use glam::{Mat4, Vec3};

/// Degrees the observer turns per arrow key press.
pub const ANGLE_STEP: f32 = 10.0;
/// Factor the observer distance changes by per page key press.
pub const ZOOM_STEP: f32 = 1.2;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;
pub const INITIAL_DISTANCE: f32 = 2.5;

/// Keys the scene reacts to, independent of the windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Quit,
}

impl Key {
    pub fn from_char(c: char) -> Option<Key> {
        match c {
            'q' | 'Q' => Some(Key::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Redraw,
    Quit,
}

/// The observer looking at the origin, and the viewport it looks through.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub distance: f32,
    /// Rotation about the X axis, in degrees.
    pub angle_x: f32,
    /// Rotation about the Y axis, in degrees.
    pub angle_y: f32,
    pub fov_degrees: f32,
    pub width: u32,
    pub height: u32,
}

impl Scene {
    pub fn new(width: u32, height: u32, fov_degrees: f32) -> Self {
        Self {
            distance: INITIAL_DISTANCE,
            angle_x: 0.0,
            angle_y: 0.0,
            fov_degrees,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn key_press(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Left => self.angle_y -= ANGLE_STEP,
            Key::Right => self.angle_y += ANGLE_STEP,
            Key::Up => self.angle_x -= ANGLE_STEP,
            Key::Down => self.angle_x += ANGLE_STEP,
            Key::PageUp => self.distance *= ZOOM_STEP,
            Key::PageDown => self.distance /= ZOOM_STEP,
            Key::Quit => return KeyOutcome::Quit,
        }

        log::trace!(
            "observer at distance {:.3}, angles ({}, {})",
            self.distance,
            self.angle_x,
            self.angle_y
        );
        KeyOutcome::Redraw
    }

    /// A minimized window reports a zero size; it's clamped so the aspect ratio stays finite.
    pub fn reshape(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_degrees.to_radians(), self.aspect(), NEAR_PLANE, FAR_PLANE)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.angle_x.to_radians())
            * Mat4::from_rotation_y(self.angle_y.to_radians())
    }

    /// projection · view · model
    pub fn mvp(&self, model: &Mat4) -> Mat4 {
        self.projection() * self.view() * *model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn arrow_keys_turn_the_observer() {
        let mut scene = Scene::new(500, 500, 45.0);

        assert_eq!(scene.key_press(Key::Left), KeyOutcome::Redraw);
        assert_eq!(scene.angle_y, -10.0);
        scene.key_press(Key::Right);
        scene.key_press(Key::Right);
        assert_eq!(scene.angle_y, 10.0);

        scene.key_press(Key::Up);
        assert_eq!(scene.angle_x, -10.0);
        scene.key_press(Key::Down);
        scene.key_press(Key::Down);
        assert_eq!(scene.angle_x, 10.0);
    }

    #[test]
    fn page_keys_zoom() {
        let mut scene = Scene::new(500, 500, 45.0);

        scene.key_press(Key::PageUp);
        assert!(close(scene.distance, INITIAL_DISTANCE * 1.2));
        scene.key_press(Key::PageDown);
        scene.key_press(Key::PageDown);
        assert!(close(scene.distance, INITIAL_DISTANCE / 1.2));
    }

    #[test]
    fn quit_leaves_the_scene_alone() {
        let mut scene = Scene::new(500, 500, 45.0);
        let before = scene.clone();

        assert_eq!(Key::from_char('q'), Some(Key::Quit));
        assert_eq!(Key::from_char('Q'), Some(Key::Quit));
        assert_eq!(Key::from_char('x'), None);
        assert_eq!(scene.key_press(Key::Quit), KeyOutcome::Quit);
        assert_eq!(scene, before);
    }

    #[test]
    fn reshape_changes_aspect() {
        let mut scene = Scene::new(500, 500, 45.0);
        assert!(close(scene.aspect(), 1.0));

        scene.reshape(800, 400);
        assert!(close(scene.aspect(), 2.0));

        scene.reshape(0, 0);
        assert_eq!((scene.width, scene.height), (1, 1));
    }

    #[test]
    fn view_moves_the_origin_away() {
        let scene = Scene::new(500, 500, 45.0);
        let origin = scene.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);

        assert!(close(origin.z, -INITIAL_DISTANCE));
    }

    #[test]
    fn rotation_applies_before_translation() {
        let mut scene = Scene::new(500, 500, 45.0);
        for _ in 0..9 {
            scene.key_press(Key::Right);
        }

        // A quarter turn about Y takes +X to -Z, then the translation pushes it further away
        let p = scene.view() * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(close(p.x, 0.0));
        assert!(close(p.z, -INITIAL_DISTANCE - 1.0));
    }

    #[test]
    fn origin_projects_to_the_center() {
        let scene = Scene::new(640, 480, 60.0);
        let clip = scene.mvp(&Mat4::IDENTITY) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(close(ndc.x, 0.0));
        assert!(close(ndc.y, 0.0));
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }
}
