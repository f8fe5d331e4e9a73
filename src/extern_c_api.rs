pub mod ffi {
    use std::ffi::{c_char, c_int, CStr, CString};
    use std::{ptr, slice};
    use crate::common::{Detection, ModelOutputDescriptor, OutputConvention, YoloBox};
    use crate::data::{LabelTable, Thresholds};
    use crate::detection_runners::{CapOrder, DetectionPipeline, ScoreNormalization, TensorView};
    use crate::error::DecodeError;

    pub const YOLO_OK: c_int = 0;
    pub const YOLO_ERR_NULL: c_int = -1;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub struct BoxFfi {
        pub x1: f32,
        pub y1: f32,
        pub x2: f32,
        pub y2: f32,
        pub width: f32,
        pub height: f32,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct DescriptorFfi {
        pub num_classes: usize,
        pub mask_channel_count: usize,
        pub keypoint_count: usize,
        pub keypoint_dims: usize,
        /// Non-zero for `[detections, 6 + extras]` outputs.
        pub fixed_stride: u8,
        pub input_width: f32,
        pub input_height: f32,
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct ThresholdsFfi {
        pub confidence_threshold: f32,
        pub iou_threshold: f32,
        pub max_detections: usize,
    }

    /// Per-model pipeline options. A null options pointer means all defaults.
    #[repr(C)]
    #[derive(Debug, Clone, Copy)]
    pub struct OptionsFfi {
        /// `label_count` NUL-terminated class names, indexed by class id. May be null.
        pub labels: *const *const c_char,
        pub label_count: usize,
        /// Non-zero when the fixed-stride score field holds logits.
        pub sigmoid_scores: u8,
        /// Non-zero to re-sort by confidence across classes before the result cap.
        pub global_confidence_cap: u8,
    }

    impl Default for OptionsFfi {
        fn default() -> Self {
            Self {
                labels: ptr::null(),
                label_count: 0,
                sigmoid_scores: 0,
                global_confidence_cap: 0,
            }
        }
    }

    /// Every pointer is owned by the library and released by [`yolo_postprocess_free`].
    #[repr(C)]
    #[derive(Debug)]
    pub struct DetectionFfi {
        pub class_index: usize,
        pub confidence: f32,
        pub bbox: BoxFfi,
        pub normalized_bbox: BoxFfi,
        pub label: *mut c_char,
        pub mask_coefficients: *mut f32,
        pub mask_len: usize,
        /// `keypoint_len` triplets of `x, y, confidence`.
        pub keypoints: *mut f32,
        pub keypoint_len: usize,
    }

    impl From<DescriptorFfi> for ModelOutputDescriptor {
        fn from(d: DescriptorFfi) -> Self {
            let output_convention = if d.fixed_stride != 0 {
                OutputConvention::FixedStride
            } else {
                OutputConvention::Legacy
            };
            ModelOutputDescriptor {
                num_classes: d.num_classes,
                mask_channel_count: d.mask_channel_count,
                keypoint_count: d.keypoint_count,
                keypoint_dims: d.keypoint_dims,
                output_convention,
                input_width: d.input_width,
                input_height: d.input_height,
            }
        }
    }

    impl From<ThresholdsFfi> for Thresholds {
        fn from(t: ThresholdsFfi) -> Self {
            Thresholds::new(t.confidence_threshold, t.iou_threshold, t.max_detections)
        }
    }

    impl From<&YoloBox> for BoxFfi {
        fn from(b: &YoloBox) -> Self {
            BoxFfi {
                x1: b.x1,
                y1: b.y1,
                x2: b.x2,
                y2: b.y2,
                width: b.w,
                height: b.h,
            }
        }
    }

    fn into_raw_parts<T>(values: Vec<T>) -> (*mut T, usize) {
        if values.is_empty() {
            return (ptr::null_mut(), 0);
        }
        let len = values.len();
        (Box::into_raw(values.into_boxed_slice()).cast::<T>(), len)
    }

    unsafe fn drop_raw_parts<T>(data: *mut T, len: usize) {
        if !data.is_null() {
            drop(Box::from_raw(ptr::slice_from_raw_parts_mut(data, len)));
        }
    }

    fn to_ffi_detection(detection: Detection) -> DetectionFfi {
        // interior NUL cannot come from a sane label file; fall back to no label
        let label = CString::new(detection.class_name)
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut());
        let (mask_coefficients, mask_len) = into_raw_parts(detection.mask_coefficients);
        let keypoint_len = detection.keypoints.len();
        let (keypoints, _) = into_raw_parts(
            detection
                .keypoints
                .iter()
                .flat_map(|k| [k.x, k.y, k.confidence])
                .collect::<Vec<f32>>(),
        );
        DetectionFfi {
            class_index: detection.class_index,
            confidence: detection.confidence,
            bbox: BoxFfi::from(&detection.bbox),
            normalized_bbox: BoxFfi::from(&detection.normalized_bbox),
            label,
            mask_coefficients,
            mask_len,
            keypoints,
            keypoint_len,
        }
    }

    /// # Safety
    ///
    /// `options.labels`, when not null, must point at `label_count` pointers that are each
    /// null or a NUL-terminated string.
    unsafe fn labels_from_ffi(options: &OptionsFfi) -> LabelTable {
        if options.labels.is_null() || options.label_count == 0 {
            return LabelTable::default();
        }
        slice::from_raw_parts(options.labels, options.label_count)
            .iter()
            .map(|&name| {
                if name.is_null() {
                    String::new()
                } else {
                    CStr::from_ptr(name).to_string_lossy().into_owned()
                }
            })
            .collect::<Vec<String>>()
            .into()
    }

    fn pipeline_from_ffi(descriptor: DescriptorFfi, options: &OptionsFfi, labels: LabelTable) -> Result<DetectionPipeline, DecodeError> {
        let score_normalization = if options.sigmoid_scores != 0 {
            ScoreNormalization::Sigmoid
        } else {
            ScoreNormalization::Identity
        };
        let cap_order = if options.global_confidence_cap != 0 {
            CapOrder::GlobalConfidence
        } else {
            CapOrder::ClassOrder
        };
        Ok(DetectionPipeline::new(descriptor.into())?
            .with_labels(labels)
            .with_score_normalization(score_normalization)
            .with_cap_order(cap_order))
    }

    fn run(buffer: &[f32], shape: &[usize], pipeline: Result<DetectionPipeline, DecodeError>, thresholds: ThresholdsFfi) -> Result<Vec<Detection>, DecodeError> {
        let tensor = TensorView::new(buffer, shape)?;
        pipeline?.run(&tensor, &thresholds.into())
    }

    /// Decodes one output buffer. Returns 0 on success, -1 on a null argument,
    /// or the negative code of the validation error.
    ///
    /// # Safety
    ///
    /// `buffer` must point at `buffer_len` floats and `shape` at `rank` sizes.
    /// `options` may be null; otherwise it follows the rules on [`OptionsFfi`].
    /// `out_detections` and `out_len` must be writable. On success the caller owns the
    /// returned array and must hand it back to [`yolo_postprocess_free`].
    #[no_mangle]
    pub unsafe extern "C" fn yolo_postprocess_run(
        buffer: *const f32,
        buffer_len: usize,
        shape: *const usize,
        rank: usize,
        descriptor: *const DescriptorFfi,
        thresholds: *const ThresholdsFfi,
        options: *const OptionsFfi,
        out_detections: *mut *mut DetectionFfi,
        out_len: *mut usize,
    ) -> c_int {
        if buffer.is_null() || shape.is_null() || descriptor.is_null() || thresholds.is_null()
            || out_detections.is_null() || out_len.is_null() {
            return YOLO_ERR_NULL;
        }

        let buffer = slice::from_raw_parts(buffer, buffer_len);
        let shape = slice::from_raw_parts(shape, rank);

        let options = if options.is_null() { OptionsFfi::default() } else { *options };
        let pipeline = pipeline_from_ffi(*descriptor, &options, labels_from_ffi(&options));

        match run(buffer, shape, pipeline, *thresholds) {
            Ok(detections) => {
                let ffi_detections = detections
                    .into_iter()
                    .map(to_ffi_detection)
                    .collect::<Vec<DetectionFfi>>();
                let (data, len) = into_raw_parts(ffi_detections);
                *out_detections = data;
                *out_len = len;
                YOLO_OK
            }
            Err(e) => {
                log::warn!("yolo_postprocess_run failed: {e}");
                *out_detections = ptr::null_mut();
                *out_len = 0;
                e.code()
            }
        }
    }

    /// Releases an array returned by [`yolo_postprocess_run`]. Null is a no-op.
    ///
    /// # Safety
    ///
    /// `detections` and `len` must be exactly what [`yolo_postprocess_run`] wrote out,
    /// and the array must not be freed twice.
    #[no_mangle]
    pub unsafe extern "C" fn yolo_postprocess_free(detections: *mut DetectionFfi, len: usize) {
        if detections.is_null() {
            return;
        }
        let detections = Box::from_raw(ptr::slice_from_raw_parts_mut(detections, len));
        for d in detections.iter() {
            if !d.label.is_null() {
                drop(CString::from_raw(d.label));
            }
            drop_raw_parts(d.mask_coefficients, d.mask_len);
            drop_raw_parts(d.keypoints, d.keypoint_len * 3);
        }
    }
}
