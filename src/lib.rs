pub mod configuration;

pub mod distribution {
    pub mod distributionerror;
    pub mod cdfbuilder;
    pub mod quantilebuilder;
    pub mod sampler;
    pub mod distribution;
}

pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod nonparametriccurve {
            pub mod nonparametriccurve;
            pub mod bspline;
            pub mod piecewisepolynomial;
        }
    }
}

pub mod validation {
    pub mod goodnessoffit;
}
