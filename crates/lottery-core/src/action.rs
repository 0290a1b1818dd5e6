//! Declarative tweens applied to scene nodes.
//!
//! An [`Action`] describes what should happen to a node over time; an
//! [`ActionRunner`] plays one action against one node, a fixed step at a time.
//! Tweens capture their start value on the first tick they run, so relative
//! actions compose inside sequences.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::node::{NodeId, SceneNode};

/// Easing function type for tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingType {
    /// Applies the easing function to a normalized time value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Node property a tween writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Position,
    Size,
    Rotation,
    Alpha,
}

impl Channel {
    fn read(self, node: &SceneNode) -> Vec2 {
        match self {
            Self::Position => node.position,
            Self::Size => node.size,
            Self::Rotation => Vec2::new(node.rotation, 0.0),
            Self::Alpha => Vec2::new(node.alpha, 0.0),
        }
    }

    fn write(self, node: &mut SceneNode, value: Vec2) {
        match self {
            Self::Position => node.position = value,
            Self::Size => node.size = value,
            Self::Rotation => node.rotation = value.x,
            Self::Alpha => node.alpha = value.x,
        }
    }
}

/// Something that happens to a node over time.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MoveBy {
        delta: Vec2,
        duration: f32,
        easing: EasingType,
    },
    MoveTo {
        target: Vec2,
        duration: f32,
        easing: EasingType,
    },
    ResizeTo {
        size: Vec2,
        duration: f32,
        easing: EasingType,
    },
    RotateTo {
        angle: f32,
        duration: f32,
        easing: EasingType,
    },
    RotateBy {
        angle: f32,
        duration: f32,
        easing: EasingType,
    },
    FadeTo {
        alpha: f32,
        duration: f32,
        easing: EasingType,
    },
    Wait(f32),
    /// Runs children one after another.
    Sequence(Vec<Action>),
    /// Runs children together; finishes with the longest.
    Group(Vec<Action>),
    /// Repeats an action `count` times, or forever when `None`.
    Repeat {
        action: Box<Action>,
        count: Option<u32>,
    },
    /// Asks the owner to remove the node.
    Remove,
}

impl Action {
    pub fn move_by(delta: Vec2, duration: f32) -> Self {
        Self::MoveBy {
            delta,
            duration,
            easing: EasingType::Linear,
        }
    }

    pub fn move_to(target: Vec2, duration: f32) -> Self {
        Self::MoveTo {
            target,
            duration,
            easing: EasingType::Linear,
        }
    }

    pub fn resize_to(size: Vec2, duration: f32) -> Self {
        Self::ResizeTo {
            size,
            duration,
            easing: EasingType::Linear,
        }
    }

    pub fn rotate_to(angle: f32, duration: f32) -> Self {
        Self::RotateTo {
            angle,
            duration,
            easing: EasingType::Linear,
        }
    }

    pub fn rotate_by(angle: f32, duration: f32) -> Self {
        Self::RotateBy {
            angle,
            duration,
            easing: EasingType::Linear,
        }
    }

    pub fn fade_to(alpha: f32, duration: f32) -> Self {
        Self::FadeTo {
            alpha,
            duration,
            easing: EasingType::Linear,
        }
    }

    pub fn fade_out(duration: f32) -> Self {
        Self::fade_to(0.0, duration)
    }

    pub fn wait(duration: f32) -> Self {
        Self::Wait(duration)
    }

    pub fn sequence(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::Sequence(actions.into_iter().collect())
    }

    pub fn group(actions: impl IntoIterator<Item = Action>) -> Self {
        Self::Group(actions.into_iter().collect())
    }

    pub fn repeat(action: Action, count: u32) -> Self {
        Self::Repeat {
            action: Box::new(action),
            count: Some(count),
        }
    }

    pub fn repeat_forever(action: Action) -> Self {
        Self::Repeat {
            action: Box::new(action),
            count: None,
        }
    }

    /// Replaces the easing of a tween. Other actions are returned unchanged.
    #[must_use]
    pub fn eased(mut self, with: EasingType) -> Self {
        match &mut self {
            Self::MoveBy { easing, .. }
            | Self::MoveTo { easing, .. }
            | Self::ResizeTo { easing, .. }
            | Self::RotateTo { easing, .. }
            | Self::RotateBy { easing, .. }
            | Self::FadeTo { easing, .. } => *easing = with,
            _ => {}
        }
        self
    }

    /// Total running time, or `None` when the action never ends.
    pub fn duration(&self) -> Option<f32> {
        match self {
            Self::MoveBy { duration, .. }
            | Self::MoveTo { duration, .. }
            | Self::ResizeTo { duration, .. }
            | Self::RotateTo { duration, .. }
            | Self::RotateBy { duration, .. }
            | Self::FadeTo { duration, .. }
            | Self::Wait(duration) => Some(duration.max(0.0)),
            Self::Sequence(actions) => actions.iter().map(Action::duration).sum(),
            Self::Group(actions) => actions
                .iter()
                .map(Action::duration)
                .try_fold(0.0_f32, |longest, d| d.map(|d| longest.max(d))),
            Self::Repeat { action, count } => {
                let count = (*count)?;
                action.duration().map(|d| d * count as f32)
            }
            Self::Remove => Some(0.0),
        }
    }

    fn start(&self) -> Running {
        match self {
            Self::MoveBy {
                delta,
                duration,
                easing,
            } => Tween::relative(Channel::Position, *delta, *duration, *easing),
            Self::MoveTo {
                target,
                duration,
                easing,
            } => Tween::absolute(Channel::Position, *target, *duration, *easing),
            Self::ResizeTo {
                size,
                duration,
                easing,
            } => Tween::absolute(Channel::Size, *size, *duration, *easing),
            Self::RotateTo {
                angle,
                duration,
                easing,
            } => Tween::absolute(Channel::Rotation, Vec2::new(*angle, 0.0), *duration, *easing),
            Self::RotateBy {
                angle,
                duration,
                easing,
            } => Tween::relative(Channel::Rotation, Vec2::new(*angle, 0.0), *duration, *easing),
            Self::FadeTo {
                alpha,
                duration,
                easing,
            } => Tween::absolute(
                Channel::Alpha,
                Vec2::new(alpha.clamp(0.0, 1.0), 0.0),
                *duration,
                *easing,
            ),
            Self::Wait(duration) => Running::Wait {
                remaining: duration.max(0.0),
            },
            Self::Sequence(actions) => Running::Sequence {
                actions: actions.clone(),
                index: 0,
                current: None,
            },
            Self::Group(actions) => Running::Group {
                children: actions.iter().map(|a| Some(a.start())).collect(),
            },
            Self::Repeat { action, count } => Running::Repeat {
                action: action.clone(),
                remaining: *count,
                current: None,
            },
            Self::Remove => Running::Remove,
        }
    }
}

/// A single-channel interpolation.
#[derive(Debug, Clone)]
struct Tween {
    channel: Channel,
    /// Absolute end value, or an offset when `relative` is set.
    value: Vec2,
    relative: bool,
    /// Start and end, captured on the first tick.
    span: Option<(Vec2, Vec2)>,
    elapsed: f32,
    duration: f32,
    easing: EasingType,
}

impl Tween {
    fn absolute(channel: Channel, value: Vec2, duration: f32, easing: EasingType) -> Running {
        Self::start(channel, value, false, duration, easing)
    }

    fn relative(channel: Channel, offset: Vec2, duration: f32, easing: EasingType) -> Running {
        Self::start(channel, offset, true, duration, easing)
    }

    fn start(
        channel: Channel,
        value: Vec2,
        relative: bool,
        duration: f32,
        easing: EasingType,
    ) -> Running {
        Running::Tween(Self {
            channel,
            value,
            relative,
            span: None,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
        })
    }

    fn advance(&mut self, node: &mut SceneNode, dt: f32) -> Step {
        let (from, to) = match self.span {
            Some(span) => span,
            None => {
                let from = self.channel.read(node);
                let to = if self.relative {
                    from + self.value
                } else {
                    self.value
                };
                self.span = Some((from, to));
                (from, to)
            }
        };
        self.elapsed += dt;
        let (t, step) = if self.elapsed >= self.duration {
            (1.0, Step::Done(self.elapsed - self.duration))
        } else {
            (self.elapsed / self.duration, Step::Running)
        };
        self.channel
            .write(node, from.lerp(to, self.easing.apply(t)));
        step
    }
}

#[derive(Debug, Clone)]
enum Running {
    Tween(Tween),
    Wait {
        remaining: f32,
    },
    Sequence {
        actions: Vec<Action>,
        index: usize,
        current: Option<Box<Running>>,
    },
    Group {
        children: Vec<Option<Running>>,
    },
    Repeat {
        action: Box<Action>,
        remaining: Option<u32>,
        current: Option<Box<Running>>,
    },
    Remove,
}

/// Result of advancing a running action.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Running,
    /// Finished with this much of the tick left over.
    Done(f32),
}

impl Running {
    /// Advances by `dt`; sets `remove` when a [`Action::Remove`] runs.
    fn advance(&mut self, node: &mut SceneNode, remove: &mut bool, dt: f32) -> Step {
        match self {
            Self::Tween(tween) => tween.advance(node, dt),
            Self::Wait { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    Step::Done(-*remaining)
                } else {
                    Step::Running
                }
            }
            Self::Sequence {
                actions,
                index,
                current,
            } => {
                let mut left = dt;
                loop {
                    if current.is_none() {
                        let Some(next) = actions.get(*index) else {
                            return Step::Done(left);
                        };
                        *current = Some(Box::new(next.start()));
                    }
                    let Some(running) = current.as_mut() else {
                        return Step::Done(left);
                    };
                    match running.advance(node, remove, left) {
                        Step::Running => return Step::Running,
                        Step::Done(rest) => {
                            left = rest;
                            *index += 1;
                            *current = None;
                        }
                    }
                }
            }
            Self::Group { children } => {
                let mut shortest_rest: Option<f32> = None;
                for slot in children.iter_mut() {
                    let Some(child) = slot else {
                        continue;
                    };
                    if let Step::Done(rest) = child.advance(node, remove, dt) {
                        *slot = None;
                        shortest_rest = Some(shortest_rest.map_or(rest, |r| r.min(rest)));
                    }
                }
                if children.iter().all(Option::is_none) {
                    Step::Done(shortest_rest.unwrap_or(dt))
                } else {
                    Step::Running
                }
            }
            Self::Repeat {
                action,
                remaining,
                current,
            } => {
                let mut left = dt;
                loop {
                    if *remaining == Some(0) {
                        return Step::Done(left);
                    }
                    let running = current.get_or_insert_with(|| Box::new(action.start()));
                    match running.advance(node, remove, left) {
                        Step::Running => return Step::Running,
                        Step::Done(rest) => {
                            *current = None;
                            match remaining {
                                Some(count) => *count -= 1,
                                // A pass that used no time would loop forever within this tick.
                                None if rest >= left => return Step::Running,
                                None => {}
                            }
                            left = rest;
                        }
                    }
                }
            }
            Self::Remove => {
                *remove = true;
                Step::Done(dt)
            }
        }
    }
}

/// Outcome of one [`ActionRunner::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick {
    /// True on the single tick the action completes.
    pub finished: bool,
    /// The action asked for its node to be removed.
    pub remove: bool,
}

/// Plays one action against one node.
#[derive(Debug, Clone)]
pub struct ActionRunner {
    node: NodeId,
    state: Running,
    finished: bool,
}

impl ActionRunner {
    pub fn new(node: NodeId, action: Action) -> Self {
        let state = action.start();
        Self {
            node,
            state,
            finished: false,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the action by `dt` seconds.
    pub fn tick(&mut self, node: &mut SceneNode, dt: f32) -> Tick {
        if self.finished {
            return Tick::default();
        }
        let mut remove = false;
        let step = self.state.advance(node, &mut remove, dt);
        self.finished = matches!(step, Step::Done(_));
        Tick {
            finished: self.finished,
            remove,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::NodeKind;
    use crate::physics::PHYSICS_DT;

    use super::*;

    fn node() -> SceneNode {
        SceneNode::new(NodeKind::Coin, "coin", Vec2::new(10.0, 20.0), Vec2::new(100.0, 100.0))
    }

    fn run(runner: &mut ActionRunner, node: &mut SceneNode, frames: u32) -> Vec<Tick> {
        (0..frames).map(|_| runner.tick(node, PHYSICS_DT)).collect()
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingType::Linear,
            EasingType::EaseIn,
            EasingType::EaseOut,
            EasingType::EaseInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6);
        }
        assert!(EasingType::EaseIn.apply(0.5) < 0.5);
        assert!(EasingType::EaseOut.apply(0.5) > 0.5);
    }

    #[test]
    fn test_eased_tween_lands_on_target() {
        let mut linear = node();
        let mut eased = node();
        let target = Vec2::new(100.0, 0.0);
        let mut a = ActionRunner::new(0, Action::move_to(target, 1.0));
        let mut b = ActionRunner::new(0, Action::move_to(target, 1.0).eased(EasingType::EaseOut));

        run(&mut a, &mut linear, 15);
        run(&mut b, &mut eased, 15);
        assert!(eased.position.x > linear.position.x);

        run(&mut a, &mut linear, 50);
        run(&mut b, &mut eased, 50);
        assert!((eased.position - target).length() < 1e-3);
        assert!((linear.position - target).length() < 1e-3);
    }

    #[test]
    fn test_eased_leaves_containers_alone() {
        let seq = Action::sequence([Action::wait(0.5)]);
        assert_eq!(seq.clone().eased(EasingType::EaseIn), seq);
    }

    #[test]
    fn test_move_by_finishes_once() {
        let mut node = node();
        let mut runner = ActionRunner::new(0, Action::move_by(Vec2::new(60.0, -30.0), 1.0));
        let ticks = run(&mut runner, &mut node, 70);

        assert_eq!(ticks.iter().filter(|t| t.finished).count(), 1);
        assert!((node.position - Vec2::new(70.0, -10.0)).length() < 1e-3);
    }

    #[test]
    fn test_halfway_interpolation() {
        let mut node = node();
        let mut runner = ActionRunner::new(0, Action::fade_out(1.0));
        run(&mut runner, &mut node, 30);
        assert!((node.alpha - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_sequence_carries_leftover_time() {
        let mut node = node();
        let action = Action::sequence([
            Action::wait(0.25),
            Action::rotate_to(1.0, 0.0),
            Action::wait(0.25),
        ]);
        let mut runner = ActionRunner::new(0, action);
        let tick = runner.tick(&mut node, 0.5);
        assert!(tick.finished);
        assert_eq!(node.rotation, 1.0);
    }

    #[test]
    fn test_relative_steps_compose_in_sequence() {
        let mut node = node();
        let step = Action::move_by(Vec2::new(10.0, 0.0), 0.1);
        let mut runner = ActionRunner::new(0, Action::repeat(step, 3));
        run(&mut runner, &mut node, 30);
        assert!((node.position.x - 40.0).abs() < 1e-3);
        assert!(runner.is_finished());
    }

    #[test]
    fn test_group_finishes_with_longest() {
        let mut node = node();
        let action = Action::group([
            Action::resize_to(Vec2::new(200.0, 50.0), 0.5),
            Action::fade_out(1.0),
        ]);
        assert_eq!(action.duration(), Some(1.0));
        let mut runner = ActionRunner::new(0, action);

        let ticks = run(&mut runner, &mut node, 45);
        assert!(ticks.iter().all(|t| !t.finished));
        assert_eq!(node.size, Vec2::new(200.0, 50.0));

        let ticks = run(&mut runner, &mut node, 20);
        assert_eq!(ticks.iter().filter(|t| t.finished).count(), 1);
        assert_eq!(node.alpha, 0.0);
    }

    #[test]
    fn test_remove_is_reported() {
        let mut node = node();
        let mut runner =
            ActionRunner::new(0, Action::sequence([Action::fade_out(0.1), Action::Remove]));
        let ticks = run(&mut runner, &mut node, 10);
        let last = ticks.iter().find(|t| t.finished).unwrap();
        assert!(last.remove);
    }

    #[test]
    fn test_repeat_forever_never_finishes() {
        let mut node = node();
        let twinkle = Action::sequence([Action::fade_out(0.5), Action::fade_to(1.0, 0.5)]);
        let action = Action::repeat_forever(twinkle);
        assert_eq!(action.duration(), None);

        let mut runner = ActionRunner::new(0, action);
        let ticks = run(&mut runner, &mut node, 600);
        assert!(ticks.iter().all(|t| !t.finished));
        assert!(node.alpha >= 0.0 && node.alpha <= 1.0);
    }

    #[test]
    fn test_zero_length_forever_does_not_hang() {
        let mut node = node();
        let mut runner = ActionRunner::new(0, Action::repeat_forever(Action::rotate_by(0.1, 0.0)));
        let tick = runner.tick(&mut node, PHYSICS_DT);
        assert!(!tick.finished);
    }

    #[test]
    fn test_duration_of_nested_actions() {
        let shake = Action::repeat(
            Action::sequence([
                Action::rotate_to(-0.1, 0.25),
                Action::rotate_to(0.0, 0.25),
                Action::rotate_to(0.1, 0.25),
                Action::rotate_to(0.0, 0.25),
            ]),
            2,
        );
        assert_eq!(shake.duration(), Some(2.0));
        assert_eq!(Action::Remove.duration(), Some(0.0));
    }
}
