use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError};
use log::{info, warn};

use crate::engine::Texture;
use crate::math_prelude::*;

//Boundary to the landmark tracking model. `detect` blocks for one frame of
//inference; None means no face was found, which is an ordinary outcome.
pub trait FaceTracker: Send {
    //Fixed for the life of the tracker and equal to the mesh vertex count
    fn landmark_count(&self) -> usize;
    //Landmarks in image space: x right, y down, z into the screen
    fn detect(&mut self, frame: &Texture) -> Option<Vec<Vec3>>;
}

//Runs a FaceTracker on its own worker thread with at most one frame of
//inference in flight. The render thread hands frames in through `request`
//and collects finished detections with `poll`; neither call blocks.
pub struct TrackerHandle {
    landmark_count: usize,
    requests: Sender<Texture>,
    results: Receiver<Option<Vec<Vec3>>>,
    in_flight: bool,
}

impl TrackerHandle {
    pub fn spawn<T: FaceTracker + 'static>(mut tracker: T) -> Self {
        let landmark_count = tracker.landmark_count();
        let (request_tx, request_rx) = bounded::<Texture>(1);
        let (result_tx, result_rx) = bounded(1);
        thread::spawn(move || {
            //Exits once the handle is dropped and the channel disconnects
            while let Ok(frame) = request_rx.recv() {
                if result_tx.send(tracker.detect(&frame)).is_err() {
                    break;
                }
            }
        });
        info!("tracking worker started, {} landmarks", landmark_count);
        Self {
            landmark_count,
            requests: request_tx,
            results: result_rx,
            in_flight: false,
        }
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    //Submits a frame unless an inference is already running. Returns whether
    //the frame was accepted.
    pub fn request(&mut self, frame: &Texture) -> bool {
        if self.in_flight {
            return false;
        }
        if self.requests.send(frame.clone()).is_err() {
            warn!("tracking worker is gone, dropping frame");
            return false;
        }
        self.in_flight = true;
        true
    }

    //Collects a finished detection if one is ready. The outer Option says
    //whether anything was ready, the inner one is the detection itself.
    pub fn poll(&mut self) -> Option<Option<Vec<Vec3>>> {
        match self.results.try_recv() {
            Ok(result) => {
                self.in_flight = false;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight = false;
                None
            }
        }
    }
}

//Plays back a canned landmark sequence, one entry per detect call, holding
//the final entry once the script runs out. Stands in for a real inference
//model in the offline viewer and in tests.
pub struct ScriptedTracker {
    landmark_count: usize,
    frames: Vec<Option<Vec<Vec3>>>,
    cursor: usize,
}

impl ScriptedTracker {
    pub fn new(landmark_count: usize, frames: Vec<Option<Vec<Vec3>>>) -> Self {
        Self {
            landmark_count,
            frames,
            cursor: 0,
        }
    }
}

impl FaceTracker for ScriptedTracker {
    fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    fn detect(&mut self, _frame: &Texture) -> Option<Vec<Vec3>> {
        let result = self.frames.get(self.cursor).cloned().flatten();
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn frame() -> Texture {
        Texture::new(4, 4)
    }

    //Spin-polls until the worker answers
    fn poll_blocking(handle: &mut TrackerHandle) -> Option<Vec<Vec3>> {
        for _ in 0..1000 {
            if let Some(result) = handle.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("tracking worker never answered");
    }

    #[test]
    fn scripted_sequence_plays_then_holds() {
        let landmarks = vec![Vec3::ONE];
        let mut tracker = ScriptedTracker::new(
            1,
            vec![Some(landmarks.clone()), None, Some(landmarks.clone())],
        );
        assert!(tracker.detect(&frame()).is_some());
        assert!(tracker.detect(&frame()).is_none());
        assert!(tracker.detect(&frame()).is_some());
        //Last entry repeats forever
        assert!(tracker.detect(&frame()).is_some());
        assert!(tracker.detect(&frame()).is_some());
    }

    #[test]
    fn handle_keeps_one_request_in_flight() {
        let mut handle = TrackerHandle::spawn(ScriptedTracker::new(1, vec![Some(vec![Vec3::ZERO])]));
        assert!(handle.request(&frame()));
        //Second request is refused until the first result is collected
        assert!(!handle.request(&frame()));
        let result = poll_blocking(&mut handle);
        assert_eq!(result, Some(vec![Vec3::ZERO]));
        assert!(handle.request(&frame()));
    }

    #[test]
    fn empty_script_reports_no_face() {
        let mut handle = TrackerHandle::spawn(ScriptedTracker::new(4, Vec::new()));
        assert_eq!(handle.landmark_count(), 4);
        assert!(handle.request(&frame()));
        assert_eq!(poll_blocking(&mut handle), None);
    }
}
