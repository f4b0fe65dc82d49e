//! Inputs the engine samples every frame: which page is showing, where the
//! page transition choreography is, and the page-supplied metrics.

use crate::constants::PROJECT_COUNT_NORM;
use crate::error::SceneError;
use std::fmt;
use std::str::FromStr;

/// Logical page the background is dressed for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageScene {
    #[default]
    Home,
    About,
    Projects,
    Contact,
}

impl PageScene {
    pub const ALL: [PageScene; 4] = [
        PageScene::Home,
        PageScene::About,
        PageScene::Projects,
        PageScene::Contact,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            PageScene::Home => "home",
            PageScene::About => "about",
            PageScene::Projects => "projects",
            PageScene::Contact => "contact",
        }
    }

    /// Parse a tag coming from outside the crate. Unknown values fall back
    /// to `Home` so a bad write can never stop the render loop.
    pub fn from_tag_or_home(tag: &str) -> PageScene {
        tag.parse().unwrap_or_else(|e: SceneError| {
            log::warn!("[scene] {e}; using home");
            PageScene::Home
        })
    }

    /// Map a route path to the scene it shows.
    pub fn from_path(path: &str) -> PageScene {
        if path.starts_with("/about") {
            PageScene::About
        } else if path.starts_with("/projects") {
            PageScene::Projects
        } else if path.starts_with("/contact") {
            PageScene::Contact
        } else {
            PageScene::Home
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            PageScene::Home => "/",
            PageScene::About => "/about",
            PageScene::Projects => "/projects",
            PageScene::Contact => "/contact",
        }
    }
}

impl FromStr for PageScene {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "home" => Ok(PageScene::Home),
            "about" => Ok(PageScene::About),
            "projects" => Ok(PageScene::Projects),
            "contact" => Ok(PageScene::Contact),
            other => Err(SceneError::UnknownScene(other.to_string())),
        }
    }
}

impl fmt::Display for PageScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Choreography flag set by the navigation controller.
///
/// `Pre` shakes the camera and brightens the stick shader. `Blast` is carried
/// through but no deformation branch reads it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionPhase {
    #[default]
    Idle,
    Pre,
    Blast,
}

impl TransitionPhase {
    pub fn tag(self) -> &'static str {
        match self {
            TransitionPhase::Idle => "idle",
            TransitionPhase::Pre => "pre",
            TransitionPhase::Blast => "blast",
        }
    }

    pub fn from_tag_or_idle(tag: &str) -> TransitionPhase {
        tag.parse().unwrap_or_else(|e: SceneError| {
            log::warn!("[scene] {e}; using idle");
            TransitionPhase::Idle
        })
    }
}

impl FromStr for TransitionPhase {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "idle" => Ok(TransitionPhase::Idle),
            "pre" => Ok(TransitionPhase::Pre),
            "blast" => Ok(TransitionPhase::Blast),
            other => Err(SceneError::UnknownPhase(other.to_string())),
        }
    }
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Page-supplied engagement numbers. Values may arrive out of range; use
/// [`SceneMetrics::normalized`] before mapping them to visuals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMetrics {
    /// Raw, unbounded non-negative count.
    pub project_count: f32,
    pub collaboration_factor: f32,
    pub outreach_level: f32,
}

impl Default for SceneMetrics {
    fn default() -> Self {
        Self {
            project_count: 6.0,
            collaboration_factor: 0.6,
            outreach_level: 0.55,
        }
    }
}

impl SceneMetrics {
    /// Metrics each page publishes when it is navigated to.
    pub fn preset(scene: PageScene) -> SceneMetrics {
        match scene {
            PageScene::Home => SceneMetrics::default(),
            PageScene::About => SceneMetrics {
                project_count: 8.0,
                collaboration_factor: 0.74,
                outreach_level: 0.62,
            },
            PageScene::Projects => SceneMetrics {
                project_count: 12.0,
                collaboration_factor: 0.82,
                outreach_level: 0.58,
            },
            PageScene::Contact => SceneMetrics {
                project_count: 6.0,
                collaboration_factor: 0.6,
                outreach_level: 0.96,
            },
        }
    }

    pub fn merge(&mut self, patch: MetricsPatch) {
        if let Some(v) = patch.project_count {
            self.project_count = v;
        }
        if let Some(v) = patch.collaboration_factor {
            self.collaboration_factor = v;
        }
        if let Some(v) = patch.outreach_level {
            self.outreach_level = v;
        }
    }

    /// Clamp every metric into [0, 1] at point of use. The project count is
    /// divided by eight first.
    pub fn normalized(&self) -> NormalizedMetrics {
        NormalizedMetrics {
            projects: clamp01(self.project_count / PROJECT_COUNT_NORM),
            collaboration: clamp01(self.collaboration_factor),
            outreach: clamp01(self.outreach_level),
        }
    }
}

/// Field-by-field metrics update; `None` leaves the field untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MetricsPatch {
    pub project_count: Option<f32>,
    pub collaboration_factor: Option<f32>,
    pub outreach_level: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedMetrics {
    pub projects: f32,
    pub collaboration: f32,
    pub outreach: f32,
}

/// Clamp to [0, 1]; NaN maps to 0.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_for_every_scene() {
        for scene in PageScene::ALL {
            assert_eq!(scene.tag().parse::<PageScene>(), Ok(scene));
            assert_eq!(PageScene::from_path(scene.path()), scene);
        }
    }

    #[test]
    fn unknown_tags_fail_closed() {
        assert_eq!(PageScene::from_tag_or_home("blog"), PageScene::Home);
        assert_eq!(TransitionPhase::from_tag_or_idle("boom"), TransitionPhase::Idle);
        assert!("blog".parse::<PageScene>().is_err());
    }

    #[test]
    fn nested_paths_map_to_their_section() {
        assert_eq!(PageScene::from_path("/projects/orbit"), PageScene::Projects);
        assert_eq!(PageScene::from_path("/unknown"), PageScene::Home);
        assert_eq!(PageScene::from_path(""), PageScene::Home);
    }

    #[test]
    fn normalized_clamps_out_of_range_and_nan() {
        let m = SceneMetrics {
            project_count: 40.0,
            collaboration_factor: f32::NAN,
            outreach_level: -3.0,
        };
        let n = m.normalized();
        assert_eq!(n.projects, 1.0);
        assert_eq!(n.collaboration, 0.0);
        assert_eq!(n.outreach, 0.0);
    }

    #[test]
    fn merge_only_touches_present_fields() {
        let mut m = SceneMetrics::default();
        m.merge(MetricsPatch {
            outreach_level: Some(0.9),
            ..Default::default()
        });
        assert_eq!(m.project_count, 6.0);
        assert_eq!(m.collaboration_factor, 0.6);
        assert_eq!(m.outreach_level, 0.9);
    }
}
